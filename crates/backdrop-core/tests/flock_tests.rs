// Built-in flock simulation.

use backdrop_core::*;
use glam::Vec2;
use std::time::Duration;

fn params(count: u32, connect: bool) -> RenderParameters {
    let mut p = compute_parameters(
        PerformanceTier::High,
        &BaseConfig {
            quantity: count as f32,
            ..BaseConfig::default()
        },
        false,
        false,
    );
    p.features.connect_lines = connect;
    p
}

#[test]
fn creates_requested_particle_count_inside_bounds() {
    let bounds = Vec2::new(800.0, 600.0);
    let flock = Flock::new(&params(50, false), bounds, 1);
    assert_eq!(flock.particles().len(), 50);
    for p in flock.particles() {
        assert!(p.pos.x >= 0.0 && p.pos.x <= bounds.x);
        assert!(p.pos.y >= 0.0 && p.pos.y <= bounds.y);
    }
}

#[test]
fn stepping_keeps_particles_in_bounds() {
    let bounds = Vec2::new(320.0, 240.0);
    let mut flock = Flock::new(&params(40, true), bounds, 9);
    for i in 0..300 {
        let pointer = (i % 2 == 0).then_some(Vec2::new(160.0, 120.0));
        flock.step(Duration::from_millis(16), pointer);
    }
    assert_eq!(flock.particles().len(), 40);
    for p in flock.particles() {
        assert!(p.pos.is_finite());
        assert!(p.pos.x >= 0.0 && p.pos.x <= bounds.x, "{:?}", p.pos);
        assert!(p.pos.y >= 0.0 && p.pos.y <= bounds.y, "{:?}", p.pos);
    }
}

#[test]
fn same_seed_same_motion() {
    let bounds = Vec2::new(500.0, 500.0);
    let mut a = Flock::new(&params(30, false), bounds, 42);
    let mut b = Flock::new(&params(30, false), bounds, 42);
    for _ in 0..60 {
        a.step(Duration::from_millis(16), None);
        b.step(Duration::from_millis(16), None);
    }
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn links_only_when_enabled_and_close() {
    let bounds = Vec2::new(200.0, 200.0);
    let without = Flock::new(&params(60, false), bounds, 3);
    assert!(without.links().is_empty());
    let with = Flock::new(&params(60, true), bounds, 3);
    assert!(!with.links().is_empty());
    for l in with.links() {
        assert!(l.a < l.b);
        assert!(l.alpha > 0.0 && l.alpha <= 1.0);
        let pa = with.particles()[l.a as usize].pos;
        let pb = with.particles()[l.b as usize].pos;
        assert!(pa.distance(pb) < backdrop_core::constants::FLOCK_CONNECT_DISTANCE);
    }
}

#[test]
fn resize_rescales_positions() {
    let mut flock = Flock::new(&params(20, false), Vec2::new(100.0, 100.0), 5);
    flock.resize(Vec2::new(50.0, 400.0));
    assert_eq!(flock.bounds(), Vec2::new(50.0, 400.0));
    for p in flock.particles() {
        assert!(p.pos.x < 50.0 && p.pos.y < 400.0);
    }
}

#[test]
fn degenerate_bounds_are_clamped() {
    let mut flock = Flock::new(&params(5, true), Vec2::ZERO, 11);
    assert_eq!(flock.bounds(), Vec2::ONE);
    flock.step(Duration::from_millis(16), None);
    assert_eq!(flock.particles().len(), 5);
}

#[test]
fn zero_dt_is_a_no_op() {
    let mut flock = Flock::new(&params(10, false), Vec2::new(300.0, 300.0), 2);
    let before = flock.particles().to_vec();
    flock.step(Duration::ZERO, None);
    assert_eq!(flock.particles(), &before[..]);
}
