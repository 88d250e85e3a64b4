use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tabula::events::{EventResult, WheelEvent};
use tabula::scrollbar::{Axis, FrameLoop, Scrollbar, ScrollbarConfig};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// 1000px of content in a 100px viewport on both axes.
fn overflowing() -> Scrollbar {
    let scrollbar = Scrollbar::new(ScrollbarConfig::default());
    for axis in [Axis::X, Axis::Y] {
        scrollbar.set_content(axis, 1000.0);
        scrollbar.set_viewport(axis, 100.0);
    }
    scrollbar
}

// -----------------------------------------------------------------------------
// Momentum
// -----------------------------------------------------------------------------

#[test]
fn test_config_from_json_clamps_retain() {
    let config: ScrollbarConfig =
        serde_json::from_str(r#"{"retain": 1.5, "hide_delay": 250}"#).unwrap();
    assert_eq!(config.retain, 1.0);
    assert_eq!(config.hide_delay, Duration::from_millis(250));
    assert_eq!(config.frame_interval, ScrollbarConfig::default().frame_interval);

    let config: ScrollbarConfig = serde_json::from_str(r#"{"retain": -2}"#).unwrap();
    assert_eq!(config.retain, 0.0);
}

#[test]
fn test_tick_releases_a_fifth_of_momentum() {
    let scrollbar = overflowing();
    let now = Instant::now();
    assert_eq!(scrollbar.wheel(&WheelEvent::pixels(0.0, 100.0), now), EventResult::Consumed);
    assert!(approx(scrollbar.momentum(Axis::Y), 100.0));
    assert_eq!(scrollbar.position(Axis::Y), 0.0);

    assert!(scrollbar.tick(now));
    assert!(approx(scrollbar.position(Axis::Y), 20.0));
    assert!(approx(scrollbar.momentum(Axis::Y), 80.0));

    assert!(scrollbar.tick(now));
    assert!(approx(scrollbar.position(Axis::Y), 36.0));
    assert!(approx(scrollbar.momentum(Axis::Y), 64.0));
}

#[test]
fn test_tick_flushes_momentum_under_threshold() {
    let scrollbar = overflowing();
    let now = Instant::now();
    scrollbar.wheel(&WheelEvent::pixels(0.0, 0.5), now);

    assert!(scrollbar.tick(now));
    assert!(approx(scrollbar.position(Axis::Y), 0.5));
    assert_eq!(scrollbar.momentum(Axis::Y), 0.0);
    assert!(scrollbar.is_settled());
    assert!(!scrollbar.tick(now));
}

#[test]
fn test_momentum_settles_eventually() {
    let scrollbar = overflowing();
    let now = Instant::now();
    scrollbar.wheel(&WheelEvent::pixels(0.0, 50.0), now);
    for _ in 0..100 {
        scrollbar.tick(now);
    }
    assert!(scrollbar.is_settled());
    assert!(approx(scrollbar.position(Axis::Y), 50.0));
}

#[test]
fn test_momentum_stops_at_edge() {
    let scrollbar = overflowing();
    let now = Instant::now();
    scrollbar.scroll_to(Axis::Y, 890.0);
    scrollbar.wheel(&WheelEvent::pixels(0.0, 100.0), now);

    assert!(scrollbar.tick(now));
    assert_eq!(scrollbar.position(Axis::Y), 900.0);

    assert!(!scrollbar.tick(now));
    assert_eq!(scrollbar.momentum(Axis::Y), 0.0);
}

#[test]
fn test_auto_scroll_feeds_momentum_every_frame() {
    let scrollbar = overflowing();
    let now = Instant::now();
    scrollbar.set_auto_scroll(Axis::X, 5.0);

    assert!(scrollbar.tick(now));
    assert!(approx(scrollbar.position(Axis::X), 1.0));
    assert!(!scrollbar.is_settled());

    for _ in 0..60 {
        scrollbar.tick(now);
    }
    // Steady state releases the full speed each frame.
    let before = scrollbar.position(Axis::X);
    scrollbar.tick(now);
    assert!((scrollbar.position(Axis::X) - before - 5.0).abs() < 0.01);

    scrollbar.set_auto_scroll(Axis::X, 0.0);
    assert_eq!(scrollbar.auto_scroll(Axis::X), 0.0);
}

#[test]
fn test_scroll_to_clamps_and_drops_momentum() {
    let scrollbar = overflowing();
    scrollbar.wheel(&WheelEvent::pixels(0.0, 40.0), Instant::now());
    assert!(scrollbar.scroll_to(Axis::Y, 5000.0));
    assert_eq!(scrollbar.position(Axis::Y), 900.0);
    assert_eq!(scrollbar.max_scroll(Axis::Y), 900.0);
    assert_eq!(scrollbar.momentum(Axis::Y), 0.0);

    assert!(scrollbar.scroll_by(Axis::Y, -100.0));
    assert_eq!(scrollbar.position(Axis::Y), 800.0);
    assert!(!scrollbar.scroll_to(Axis::Y, 800.0));
}

#[test]
fn test_shrinking_content_clamps_position() {
    let scrollbar = overflowing();
    scrollbar.scroll_to(Axis::Y, 900.0);
    scrollbar.set_content(Axis::Y, 300.0);
    assert_eq!(scrollbar.position(Axis::Y), 200.0);
}

// -----------------------------------------------------------------------------
// Wheel
// -----------------------------------------------------------------------------

#[test]
fn test_wheel_rejected_at_edge() {
    let scrollbar = overflowing();
    let now = Instant::now();
    assert_eq!(scrollbar.wheel(&WheelEvent::pixels(0.0, -10.0), now), EventResult::Ignored);
    assert_eq!(scrollbar.momentum(Axis::Y), 0.0);

    scrollbar.scroll_to(Axis::X, 900.0);
    assert_eq!(scrollbar.wheel(&WheelEvent::pixels(10.0, 0.0), now), EventResult::Ignored);
    assert_eq!(scrollbar.wheel(&WheelEvent::pixels(-10.0, 0.0), now), EventResult::Consumed);
}

#[test]
fn test_wheel_rejected_without_overflow() {
    let scrollbar = Scrollbar::default();
    scrollbar.set_content(Axis::Y, 50.0);
    scrollbar.set_viewport(Axis::Y, 100.0);
    assert_eq!(
        scrollbar.wheel(&WheelEvent::pixels(0.0, 10.0), Instant::now()),
        EventResult::Ignored
    );
}

#[test]
fn test_wheel_normalizes_delta_modes() {
    let now = Instant::now();

    let lines = overflowing();
    lines.wheel(&WheelEvent::lines(0.0, 2.0), now);
    assert!(approx(lines.momentum(Axis::Y), 32.0));

    let pages = overflowing();
    pages.wheel(&WheelEvent::pages(0.0, 1.0), now);
    assert!(approx(pages.momentum(Axis::Y), 100.0));

    let custom = Scrollbar::new(ScrollbarConfig::default().line_height(20.0));
    custom.set_content(Axis::Y, 1000.0);
    custom.set_viewport(Axis::Y, 100.0);
    custom.wheel(&WheelEvent::lines(0.0, 1.0), now);
    assert!(approx(custom.momentum(Axis::Y), 20.0));
}

// -----------------------------------------------------------------------------
// Geometry and drag
// -----------------------------------------------------------------------------

#[test]
fn test_geometry_respects_min_thumb() {
    let scrollbar = overflowing();
    let geometry = scrollbar.geometry(Axis::Y).unwrap();
    assert_eq!(geometry.track_length, 100.0);
    assert_eq!(geometry.thumb_length, 20.0);
    assert_eq!(geometry.thumb_start, 0.0);

    scrollbar.scroll_to(Axis::Y, 900.0);
    assert_eq!(scrollbar.geometry(Axis::Y).unwrap().thumb_start, 80.0);
}

#[test]
fn test_geometry_none_without_overflow() {
    let scrollbar = Scrollbar::default();
    scrollbar.set_content(Axis::X, 100.0);
    scrollbar.set_viewport(Axis::X, 100.0);
    assert!(scrollbar.geometry(Axis::X).is_none());
}

#[test]
fn test_track_press_centers_thumb() {
    let scrollbar = overflowing();
    let now = Instant::now();
    assert_eq!(scrollbar.begin_drag(Axis::Y, 50.0, now), EventResult::StartDrag);
    assert!(scrollbar.is_dragging());
    assert_eq!(scrollbar.drag_axis(), Some(Axis::Y));
    // (50 - 10) / 80 of 900
    assert!(approx(scrollbar.position(Axis::Y), 450.0));

    assert_eq!(scrollbar.drag_to(90.0, now), EventResult::Consumed);
    assert!(approx(scrollbar.position(Axis::Y), 900.0));

    assert_eq!(scrollbar.end_drag(now), EventResult::Consumed);
    assert!(!scrollbar.is_dragging());
    assert_eq!(scrollbar.end_drag(now), EventResult::Ignored);
}

#[test]
fn test_thumb_grab_keeps_offset() {
    let scrollbar = overflowing();
    let now = Instant::now();
    scrollbar.begin_drag(Axis::X, 5.0, now);
    assert_eq!(scrollbar.position(Axis::X), 0.0);

    scrollbar.drag_to(45.0, now);
    // (45 - 5) / 80 of 900
    assert!(approx(scrollbar.position(Axis::X), 450.0));
}

#[test]
fn test_drag_outside_track_ignored() {
    let scrollbar = overflowing();
    assert_eq!(
        scrollbar.begin_drag(Axis::Y, 150.0, Instant::now()),
        EventResult::Ignored
    );
    assert!(!scrollbar.is_dragging());
}

// -----------------------------------------------------------------------------
// Visibility
// -----------------------------------------------------------------------------

#[test]
fn test_visibility_follows_activity() {
    let scrollbar = overflowing();
    let start = Instant::now();
    assert!(!scrollbar.is_visible(start));

    scrollbar.set_hover(true, start);
    assert!(scrollbar.is_visible(start + Duration::from_secs(10)));

    scrollbar.set_hover(false, start);
    assert!(scrollbar.is_visible(start + Duration::from_millis(500)));
    assert!(!scrollbar.is_visible(start + Duration::from_millis(1500)));
}

#[test]
fn test_visible_while_moving() {
    let scrollbar = overflowing();
    let start = Instant::now();
    scrollbar.wheel(&WheelEvent::pixels(0.0, 300.0), start);
    assert!(scrollbar.is_visible(start + Duration::from_secs(5)));
}

#[test]
fn test_never_visible_without_overflow() {
    let scrollbar = Scrollbar::default();
    let now = Instant::now();
    scrollbar.set_hover(true, now);
    assert!(!scrollbar.is_visible(now));
}

// -----------------------------------------------------------------------------
// Frame loop
// -----------------------------------------------------------------------------

#[test]
fn test_frame_loop_needs_runtime() {
    assert!(FrameLoop::spawn(Scrollbar::default(), Duration::from_millis(16), || {}).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_frame_loop_drives_ticks_until_disposed() {
    let scrollbar = overflowing();
    let frames = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&frames);
    let mut frame_loop = FrameLoop::spawn(scrollbar.clone(), Duration::from_millis(16), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    assert!(frame_loop.is_running());

    scrollbar.wheel(&WheelEvent::pixels(0.0, 100.0), Instant::now());
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(approx(scrollbar.position(Axis::Y), 100.0));
    assert!(frames.load(Ordering::SeqCst) > 0);

    frame_loop.dispose();
    tokio::task::yield_now().await;
    assert!(!frame_loop.is_running());

    scrollbar.wheel(&WheelEvent::pixels(0.0, 100.0), Instant::now());
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(approx(scrollbar.position(Axis::Y), 100.0));
    assert!(approx(scrollbar.momentum(Axis::Y), 100.0));
}
