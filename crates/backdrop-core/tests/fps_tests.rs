// Frame-rate monitor and the tier ratchet.

use backdrop_core::*;
use std::time::Duration;

/// Feed one full second at `fps` and return whatever the monitor decided.
fn second_at(m: &mut FpsMonitor, fps: u32, tier: PerformanceTier) -> Option<PerformanceTier> {
    let dt = Duration::from_secs_f64(1.0 / fps as f64);
    let mut out = None;
    for _ in 0..fps {
        if let Some(t) = m.tick(dt, tier) {
            out = Some(t);
        }
    }
    out
}

#[test]
fn samples_once_per_second_after_warm_up() {
    let mut m = FpsMonitor::new();
    let dt = Duration::from_millis(20);
    let samples: Vec<f32> = (0..150).filter_map(|_| m.record_frame(dt)).collect();
    // First window is warm-up; 150 frames * 20ms = 3s -> two reported samples.
    assert_eq!(samples.len(), 2);
    for s in samples {
        assert!((s - 50.0).abs() < 0.5, "{s}");
    }
}

#[test]
fn one_low_second_does_not_degrade() {
    let mut m = FpsMonitor::new();
    second_at(&mut m, 50, PerformanceTier::High);
    assert_eq!(second_at(&mut m, 20, PerformanceTier::High), None);
    assert_eq!(second_at(&mut m, 50, PerformanceTier::High), None);
    assert_eq!(second_at(&mut m, 20, PerformanceTier::High), None);
}

#[test]
fn sustained_low_rate_degrades_one_step() {
    let mut m = FpsMonitor::new();
    second_at(&mut m, 50, PerformanceTier::High);
    assert_eq!(second_at(&mut m, 20, PerformanceTier::High), None);
    assert_eq!(
        second_at(&mut m, 20, PerformanceTier::High),
        Some(PerformanceTier::Medium)
    );
}

#[test]
fn never_degrades_below_very_low() {
    let mut m = FpsMonitor::new();
    second_at(&mut m, 10, PerformanceTier::VeryLow);
    for _ in 0..5 {
        assert_eq!(second_at(&mut m, 10, PerformanceTier::VeryLow), None);
    }
}

#[test]
fn evaluate_respects_threshold() {
    let mut m = FpsMonitor::new();
    assert_eq!(m.evaluate(30.0, PerformanceTier::Low), None);
    assert_eq!(m.evaluate(29.0, PerformanceTier::Low), None);
    assert_eq!(m.evaluate(29.0, PerformanceTier::Low), Some(PerformanceTier::VeryLow));
}

#[test]
fn reset_restarts_warm_up() {
    let mut m = FpsMonitor::new();
    second_at(&mut m, 50, PerformanceTier::High);
    second_at(&mut m, 20, PerformanceTier::High);
    m.reset();
    // Warm-up again, then one low sample: streak restarted, no degrade yet.
    assert_eq!(second_at(&mut m, 20, PerformanceTier::High), None);
    assert_eq!(second_at(&mut m, 20, PerformanceTier::High), None);
}
