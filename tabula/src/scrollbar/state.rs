//! Scrollbar state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::{Axis, ScrollbarConfig, ScrollbarDrag, ScrollbarGeometry};
use crate::events::{DeltaMode, EventResult, WheelEvent};

/// Scroll state along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AxisState {
    position: f64,
    content: f64,
    viewport: f64,
    /// Pending inertial displacement.
    momentum: f64,
    /// Externally driven displacement added every frame.
    auto_scroll: f64,
}

impl AxisState {
    fn max_scroll(&self) -> f64 {
        (self.content - self.viewport).max(0.0)
    }

    fn overflows(&self) -> bool {
        self.content > self.viewport
    }

    fn clamp(&mut self) {
        self.position = self.position.clamp(0.0, self.max_scroll());
    }

    fn is_settled(&self) -> bool {
        self.momentum == 0.0 && self.auto_scroll == 0.0
    }

    /// Whether moving by `delta` would change the position.
    fn can_move(&self, delta: f64) -> bool {
        (delta < 0.0 && self.position > 0.0) || (delta > 0.0 && self.position < self.max_scroll())
    }

    /// Advances one frame. Returns `true` if the position changed.
    fn step(&mut self, retain: f64, threshold: f64) -> bool {
        self.momentum += self.auto_scroll;
        if self.momentum == 0.0 {
            return false;
        }

        let released = if self.momentum.abs() < threshold {
            let all = self.momentum;
            self.momentum = 0.0;
            all
        } else {
            let part = self.momentum * (1.0 - retain);
            self.momentum -= part;
            part
        };

        let before = self.position;
        self.position += released;
        self.clamp();
        if self.position == before {
            // Pressing against an edge.
            self.momentum = 0.0;
            return false;
        }
        true
    }

    fn geometry(&self, min_thumb: f64) -> Option<ScrollbarGeometry> {
        if !self.overflows() || self.viewport <= 0.0 {
            return None;
        }
        let track_length = self.viewport;
        let thumb_length = (track_length * self.viewport / self.content)
            .max(min_thumb)
            .min(track_length);
        let max = self.max_scroll();
        let travel = (track_length - thumb_length).max(0.0);
        let thumb_start = if max > 0.0 {
            travel * self.position / max
        } else {
            0.0
        };
        Some(ScrollbarGeometry {
            track_length,
            thumb_start,
            thumb_length,
        })
    }
}

#[derive(Debug)]
struct ScrollbarInner {
    config: ScrollbarConfig,
    x: AxisState,
    y: AxisState,
    hovering: bool,
    drag: Option<ScrollbarDrag>,
    last_activity: Option<Instant>,
}

impl ScrollbarInner {
    fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    fn apply_drag(&mut self, pos: f64) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let min_thumb = self.config.min_thumb;
        let state = self.axis_mut(drag.axis);
        let Some(geometry) = state.geometry(min_thumb) else {
            return false;
        };
        let travel = geometry.travel();
        let ratio = if travel > 0.0 {
            ((pos - drag.grab_offset) / travel).clamp(0.0, 1.0)
        } else {
            0.0
        };
        state.position = ratio * state.max_scroll();
        state.momentum = 0.0;
        true
    }
}

/// Momentum scrollbar for one scroll target.
///
/// Holds the scroll position of both axes and drives it from wheel input,
/// thumb drags and an externally set auto-scroll speed. Wheel input only
/// adds momentum; [`Scrollbar::tick`] releases it a frame at a time.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct Scrollbar {
    inner: Arc<RwLock<ScrollbarInner>>,
    dirty: Arc<AtomicBool>,
}

impl Default for Scrollbar {
    fn default() -> Self {
        Self::new(ScrollbarConfig::default())
    }
}

impl Scrollbar {
    pub fn new(config: ScrollbarConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ScrollbarInner {
                config,
                x: AxisState::default(),
                y: AxisState::default(),
                hovering: false,
                drag: None,
                last_activity: None,
            })),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    fn read<T: Default>(&self, f: impl FnOnce(&ScrollbarInner) -> T) -> T {
        self.inner.read().map(|g| f(&g)).unwrap_or_default()
    }

    fn write<T: Default>(&self, f: impl FnOnce(&mut ScrollbarInner) -> T) -> T {
        self.inner.write().map(|mut g| f(&mut g)).unwrap_or_default()
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Returns and clears the "needs render" flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }

    pub fn config(&self) -> ScrollbarConfig {
        self.read(|g| g.config.clone())
    }

    // -------------------------------------------------------------------------
    // Dimensions
    // -------------------------------------------------------------------------

    /// Sets the visible size along `axis`. The position is clamped.
    pub fn set_viewport(&self, axis: Axis, px: f64) {
        self.write(|g| {
            let state = g.axis_mut(axis);
            state.viewport = px.max(0.0);
            state.clamp();
        });
        self.mark_dirty();
    }

    /// Sets the scrollable content size along `axis`. The position is clamped.
    pub fn set_content(&self, axis: Axis, px: f64) {
        self.write(|g| {
            let state = g.axis_mut(axis);
            state.content = px.max(0.0);
            state.clamp();
        });
        self.mark_dirty();
    }

    pub fn viewport(&self, axis: Axis) -> f64 {
        self.read(|g| g.axis(axis).viewport)
    }

    pub fn content(&self, axis: Axis) -> f64 {
        self.read(|g| g.axis(axis).content)
    }

    pub fn position(&self, axis: Axis) -> f64 {
        self.read(|g| g.axis(axis).position)
    }

    /// Largest valid position along `axis`.
    pub fn max_scroll(&self, axis: Axis) -> f64 {
        self.read(|g| g.axis(axis).max_scroll())
    }

    // -------------------------------------------------------------------------
    // Direct scrolling
    // -------------------------------------------------------------------------

    /// Jumps to `position`, dropping pending momentum. Returns `true` if the
    /// position changed.
    pub fn scroll_to(&self, axis: Axis, position: f64) -> bool {
        let changed = self.write(|g| {
            let state = g.axis_mut(axis);
            let before = state.position;
            state.position = position;
            state.momentum = 0.0;
            state.clamp();
            state.position != before
        });
        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Jumps by `delta` pixels.
    pub fn scroll_by(&self, axis: Axis, delta: f64) -> bool {
        let position = self.position(axis);
        self.scroll_to(axis, position + delta)
    }

    pub fn momentum(&self, axis: Axis) -> f64 {
        self.read(|g| g.axis(axis).momentum)
    }

    pub fn auto_scroll(&self, axis: Axis) -> f64 {
        self.read(|g| g.axis(axis).auto_scroll)
    }

    /// Sets the per-frame auto-scroll displacement; `0.0` stops it.
    pub fn set_auto_scroll(&self, axis: Axis, px_per_frame: f64) {
        self.write(|g| g.axis_mut(axis).auto_scroll = px_per_frame);
    }

    // -------------------------------------------------------------------------
    // Frames
    // -------------------------------------------------------------------------

    /// Advances one frame.
    ///
    /// On each axis the auto-scroll speed is added to the momentum, then a
    /// `1 - retain` share of it is applied to the position. Momentum under
    /// the threshold is applied at once and cleared. Returns `true` if any
    /// position changed.
    pub fn tick(&self, now: Instant) -> bool {
        let moved = self.write(|g| {
            let (retain, threshold) = (g.config.retain, g.config.threshold);
            let moved_x = g.x.step(retain, threshold);
            let moved_y = g.y.step(retain, threshold);
            if moved_x || moved_y {
                g.last_activity = Some(now);
            }
            moved_x || moved_y
        });
        if moved {
            self.mark_dirty();
        }
        moved
    }

    /// Whether no momentum or auto-scroll is pending.
    pub fn is_settled(&self) -> bool {
        self.read(|g| g.x.is_settled() && g.y.is_settled())
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Adds a wheel delta to the momentum.
    ///
    /// Line and page deltas are converted to pixels first. A delta that would
    /// not move its axis (already at that edge) is rejected; the event is
    /// ignored if no axis accepted it.
    pub fn wheel(&self, event: &WheelEvent, now: Instant) -> EventResult {
        let accepted = self.write(|g| {
            let scale = |state: &AxisState| match event.mode {
                DeltaMode::Pixel => 1.0,
                DeltaMode::Line => g.config.line_height,
                DeltaMode::Page => state.viewport,
            };
            let dx = event.dx * scale(&g.x);
            let dy = event.dy * scale(&g.y);

            let mut accepted = false;
            if dx != 0.0 && g.x.can_move(dx) {
                g.x.momentum += dx;
                accepted = true;
            }
            if dy != 0.0 && g.y.can_move(dy) {
                g.y.momentum += dy;
                accepted = true;
            }
            if accepted {
                g.last_activity = Some(now);
            }
            accepted
        });

        if accepted {
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    pub fn set_hover(&self, hovering: bool, now: Instant) {
        self.write(|g| {
            g.hovering = hovering;
            g.last_activity = Some(now);
        });
        self.mark_dirty();
    }

    /// Thumb and track geometry along `axis`; `None` when nothing overflows.
    pub fn geometry(&self, axis: Axis) -> Option<ScrollbarGeometry> {
        self.read(|g| g.axis(axis).geometry(g.config.min_thumb))
    }

    /// Starts a thumb drag at along-axis track position `pos`.
    ///
    /// Grabbing the thumb keeps the grab point under the pointer; pressing
    /// the track centers the thumb on the pointer first.
    pub fn begin_drag(&self, axis: Axis, pos: f64, now: Instant) -> EventResult {
        let started = self.write(|g| {
            let Some(geometry) = g.axis(axis).geometry(g.config.min_thumb) else {
                return false;
            };
            if !geometry.contains(pos) {
                return false;
            }
            let grab_offset = if geometry.thumb_contains(pos) {
                pos - geometry.thumb_start
            } else {
                geometry.thumb_length / 2.0
            };
            g.drag = Some(ScrollbarDrag { axis, grab_offset });
            g.last_activity = Some(now);
            g.apply_drag(pos);
            true
        });

        if started {
            self.mark_dirty();
            EventResult::StartDrag
        } else {
            EventResult::Ignored
        }
    }

    /// Moves an active drag to along-axis position `pos`.
    pub fn drag_to(&self, pos: f64, now: Instant) -> EventResult {
        let dragged = self.write(|g| {
            let moved = g.apply_drag(pos);
            if moved {
                g.last_activity = Some(now);
            }
            moved
        });
        if dragged {
            self.mark_dirty();
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    pub fn end_drag(&self, now: Instant) -> EventResult {
        let ended = self.write(|g| {
            g.last_activity = Some(now);
            g.drag.take().is_some()
        });
        if ended {
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.read(|g| g.drag.is_some())
    }

    /// Which axis is being dragged, if any.
    pub fn drag_axis(&self) -> Option<Axis> {
        self.read(|g| g.drag.map(|d| d.axis))
    }

    /// Whether the bar should be drawn at `now`.
    ///
    /// Shown while hovered, dragged or moving; hidden once everything has
    /// settled and `hide_delay` has passed since the last activity.
    pub fn is_visible(&self, now: Instant) -> bool {
        self.read(|g| {
            if !g.x.overflows() && !g.y.overflows() {
                return false;
            }
            if g.hovering || g.drag.is_some() || !g.x.is_settled() || !g.y.is_settled() {
                return true;
            }
            g.last_activity
                .is_some_and(|at| now.saturating_duration_since(at) < g.config.hide_delay)
        })
    }
}
