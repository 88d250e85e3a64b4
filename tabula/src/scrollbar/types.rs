//! Scrollbar types.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Scrollbar behavior configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollbarConfig {
    /// Share of pending momentum kept for the next frame, in `[0, 1]`.
    #[serde(deserialize_with = "unit_interval")]
    pub retain: f64,
    /// Momentum below this many pixels is applied at once and cleared.
    pub threshold: f64,
    /// Pixels per wheel line.
    pub line_height: f64,
    /// Smallest thumb length in pixels.
    pub min_thumb: f64,
    /// Track thickness in pixels.
    pub size: f64,
    /// How long the bar stays visible after the last activity.
    #[serde(with = "tabula_lib::millis")]
    pub hide_delay: Duration,
    /// Frame interval of the frame loop.
    #[serde(with = "tabula_lib::millis")]
    pub frame_interval: Duration,
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self {
            retain: 0.8,
            threshold: 1.0,
            line_height: 16.0,
            min_thumb: 20.0,
            size: 8.0,
            hide_delay: Duration::from_millis(1000),
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl ScrollbarConfig {
    pub fn retain(mut self, retain: f64) -> Self {
        self.retain = retain.clamp(0.0, 1.0);
        self
    }

    pub fn line_height(mut self, px: f64) -> Self {
        self.line_height = px;
        self
    }

    pub fn hide_delay(mut self, delay: Duration) -> Self {
        self.hide_delay = delay;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}

/// Thumb and track along one axis, in pixels from the track start.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollbarGeometry {
    pub track_length: f64,
    pub thumb_start: f64,
    pub thumb_length: f64,
}

impl ScrollbarGeometry {
    /// Check if an along-axis position is on the track.
    pub fn contains(&self, pos: f64) -> bool {
        pos >= 0.0 && pos < self.track_length
    }

    /// Check if an along-axis position is on the thumb.
    pub fn thumb_contains(&self, pos: f64) -> bool {
        pos >= self.thumb_start && pos < self.thumb_start + self.thumb_length
    }

    /// Pixels the thumb can travel.
    pub fn travel(&self) -> f64 {
        (self.track_length - self.thumb_length).max(0.0)
    }
}

/// Active thumb drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollbarDrag {
    pub axis: Axis,
    /// Offset within the thumb where it was grabbed.
    pub grab_offset: f64,
}

fn unit_interval<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    f64::deserialize(d).map(|v| v.clamp(0.0, 1.0))
}
