//! Degradation policy: tier + base config to concrete render parameters.
//!
//! Pure and total. Every input produces a parameter set with at least one
//! particle; turning the animation off entirely is a separate decision made
//! by [`animation_enabled`].

use crate::constants::*;
use crate::options::BaseConfig;
use crate::tier::PerformanceTier;
use serde::Serialize;

/// Frame-rate cap restricted to the values the engines are tuned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FrameRateCap(u32);

impl FrameRateCap {
    pub const PAUSED: FrameRateCap = FrameRateCap(0);
    pub const FPS_20: FrameRateCap = FrameRateCap(20);
    pub const FPS_30: FrameRateCap = FrameRateCap(30);
    pub const FPS_45: FrameRateCap = FrameRateCap(45);
    pub const FPS_50: FrameRateCap = FrameRateCap(50);
    pub const FPS_60: FrameRateCap = FrameRateCap(60);

    pub const ALLOWED: [u32; 6] = [0, 20, 30, 45, 50, 60];

    pub fn new(fps: u32) -> Option<FrameRateCap> {
        Self::ALLOWED.contains(&fps).then_some(FrameRateCap(fps))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_paused(self) -> bool {
        self.0 == 0
    }

    /// Minimum time between drawn frames; `None` while paused.
    pub fn frame_interval_ms(self) -> Option<f64> {
        (self.0 > 0).then(|| 1000.0 / self.0 as f64)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FeatureToggles {
    pub mouse_follow: bool,
    pub connect_lines: bool,
    pub glow: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RenderParameters {
    pub particle_count: u32,
    pub speed: f32,
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub size: f32,
    pub frame_rate_cap: FrameRateCap,
    /// Upper bound applied to `devicePixelRatio` when sizing the canvas.
    pub pixel_ratio: f32,
    pub features: FeatureToggles,
}

impl RenderParameters {
    /// Mask pointer-following off when the caller disabled mouse controls.
    pub fn with_mouse_controls(mut self, enabled: bool) -> Self {
        self.features.mouse_follow &= enabled;
        self
    }
}

/// Per-tier multipliers. Where mobile and desktop differ the pair is
/// `(mobile, desktop)`.
struct TierProfile {
    quantity: (f32, f32),
    speed: (f32, f32),
    size: f32,
    fps: (FrameRateCap, FrameRateCap),
    pixel_ratio: f32,
}

fn profile(tier: PerformanceTier) -> TierProfile {
    match tier {
        PerformanceTier::VeryLow => TierProfile {
            quantity: (0.4, 0.4),
            speed: (0.7, 0.7),
            size: 1.2,
            fps: (FrameRateCap::FPS_20, FrameRateCap::FPS_30),
            pixel_ratio: 1.0,
        },
        PerformanceTier::Low => TierProfile {
            quantity: (0.5, 0.7),
            speed: (0.8, 0.85),
            size: 1.1,
            fps: (FrameRateCap::FPS_30, FrameRateCap::FPS_45),
            pixel_ratio: 1.0,
        },
        PerformanceTier::Medium => TierProfile {
            quantity: (0.8, 0.8),
            speed: (0.9, 0.9),
            size: 1.0,
            fps: (FrameRateCap::FPS_45, FrameRateCap::FPS_50),
            pixel_ratio: 1.5,
        },
        PerformanceTier::High => TierProfile {
            quantity: (1.0, 1.0),
            speed: (1.0, 1.0),
            size: 1.0,
            fps: (FrameRateCap::FPS_60, FrameRateCap::FPS_60),
            pixel_ratio: 2.0,
        },
    }
}

fn pick((mobile, desktop): (f32, f32), is_mobile: bool) -> f32 {
    if is_mobile {
        mobile
    } else {
        desktop
    }
}

fn particle_count(quantity: f32) -> u32 {
    let q = if quantity.is_finite() { quantity } else { 1.0 };
    q.round().clamp(1.0, MAX_PARTICLES as f32) as u32
}

fn features_for(tier: PerformanceTier) -> FeatureToggles {
    FeatureToggles {
        mouse_follow: tier >= PerformanceTier::Low,
        connect_lines: tier >= PerformanceTier::Medium,
        glow: tier == PerformanceTier::High,
    }
}

pub fn compute_parameters(
    tier: PerformanceTier,
    base: &BaseConfig,
    force_high_performance: bool,
    is_mobile: bool,
) -> RenderParameters {
    if force_high_performance && is_mobile {
        // Fewer, larger particles at full speed reads as the same effect.
        return RenderParameters {
            particle_count: particle_count(base.quantity * MOBILE_PARITY_QUANTITY),
            speed: base.speed,
            separation: base.separation,
            alignment: base.alignment,
            cohesion: base.cohesion,
            size: base.size * MOBILE_PARITY_SIZE,
            frame_rate_cap: FrameRateCap::FPS_60,
            pixel_ratio: MOBILE_PARITY_PIXEL_RATIO,
            features: FeatureToggles {
                mouse_follow: true,
                connect_lines: true,
                glow: false,
            },
        };
    }

    let p = profile(tier);
    RenderParameters {
        particle_count: particle_count(base.quantity * pick(p.quantity, is_mobile)),
        speed: base.speed * pick(p.speed, is_mobile),
        separation: base.separation,
        alignment: base.alignment,
        cohesion: base.cohesion,
        size: base.size * p.size,
        frame_rate_cap: if is_mobile { p.fps.0 } else { p.fps.1 },
        pixel_ratio: p.pixel_ratio,
        features: features_for(tier),
    }
}

/// Whether to animate at all. `false` selects the static fallback.
pub fn animation_enabled(prefers_reduced_motion: bool, respect_reduced_motion: bool) -> bool {
    !(prefers_reduced_motion && respect_reduced_motion)
}
