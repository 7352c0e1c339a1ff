use approx::assert_abs_diff_eq;
use blob_dynamics::*;

fn sample(x: f32, t: u64) -> MovementSample {
    MovementSample::new(Vec2::new(x, 0.0), t)
}

fn dragged_tracker() -> MovementTracker {
    let mut tracker = MovementTracker::default();
    tracker.push_sample(sample(0.0, 0));
    tracker.push_sample(sample(50.0, 16));
    tracker.push_sample(sample(100.0, 32));
    tracker
}

#[test]
fn quick_drag_is_significant() {
    let mut tracker = dragged_tracker();

    match tracker.process(32) {
        TrackerUpdate::Significant {
            velocity,
            inertia,
            started,
        } => {
            assert!(started);
            assert_abs_diff_eq!(velocity.x, 2187.5, epsilon = 1e-2);
            assert_abs_diff_eq!(velocity.y, 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(inertia.x, 1312.5, epsilon = 1e-2);
        }
        other => panic!("expected movement, got {other:?}"),
    }
    assert!(tracker.is_moving());

    // still moving on the next tick, but not a fresh start
    assert!(matches!(
        tracker.process(40),
        TrackerUpdate::Significant { started: false, .. }
    ));
}

#[test]
fn stale_buffer_eventually_stops_once() {
    let mut tracker = dragged_tracker();
    let mut stops = 0;
    let mut now = 32;

    for _ in 0..400 {
        if tracker.process(now) == TrackerUpdate::Stopped {
            stops += 1;
        }
        now += 8;
    }

    assert_eq!(stops, 1);
    assert!(!tracker.is_moving());
    assert_eq!(tracker.smoothed_velocity(), Vec2::ZERO);
}

#[test]
fn estimate_is_exponentially_smoothed() {
    let mut tracker = MovementTracker::default();
    tracker.push_sample(sample(0.0, 0));
    tracker.push_sample(sample(10.0, 700));
    tracker.process(700);
    assert_abs_diff_eq!(tracker.smoothed_velocity().x, 10.0, epsilon = 1e-4);

    tracker.push_sample(sample(40.0, 1400));
    tracker.process(1400);
    // raw estimate (7.5 + 30) / 1.75, mixed 70/30 with the previous value
    assert_abs_diff_eq!(tracker.smoothed_velocity().x, 13.428_571, epsilon = 1e-4);
}

#[test]
fn stale_buffer_keeps_latest_sample() {
    let mut tracker = dragged_tracker();
    tracker.process(600);
    assert_eq!(tracker.len(), 1);
    assert_eq!(tracker.samples().next().map(|s| s.timestamp_ms), Some(32));
}

#[test]
fn slow_drift_is_not_significant() {
    let mut tracker = MovementTracker::default();
    tracker.push_sample(sample(0.0, 0));
    tracker.push_sample(sample(0.1, 700));
    assert_eq!(tracker.process(700), TrackerUpdate::Quiet);
    assert!(!tracker.is_moving());
}

#[test]
fn fresh_samples_hold_off_stop_counting() {
    let mut tracker = dragged_tracker();
    tracker.process(32);

    // the window keeps reporting, just without moving
    let mut now = 32;
    for _ in 0..100 {
        now += 8;
        tracker.push_sample(sample(100.0, now));
        assert_ne!(tracker.process(now), TrackerUpdate::Stopped);
        assert_eq!(tracker.inactivity_ticks(), 0);
    }
    assert_eq!(tracker.smoothed_velocity(), Vec2::ZERO);
    assert!(tracker.is_moving());

    // once reports stop, counting resumes after the grace period
    tracker.process(now + 250);
    assert_eq!(tracker.inactivity_ticks(), 1);
}

#[test]
fn pausing_forgets_everything() {
    let mut tracker = dragged_tracker();
    tracker.process(32);
    tracker.set_paused(true);

    assert!(tracker.is_empty());
    assert!(!tracker.is_moving());
    assert!(!tracker.push_sample(sample(10.0, 50)));
    assert_eq!(tracker.process(60), TrackerUpdate::Quiet);

    tracker.set_paused(false);
    assert!(tracker.push_sample(sample(10.0, 70)));
}
