//! Achieved frame-rate monitor with a one-way tier ratchet.

use crate::constants::*;
use crate::tier::PerformanceTier;
use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct FpsMonitor {
    frames: u32,
    window: Duration,
    warmed_up: bool,
    low_streak: u32,
}

impl FpsMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget history, e.g. after a pause or an engine rebuild.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record one frame `dt` after the previous one. Returns the measured
    /// rate each time a full sample window has elapsed. The first window
    /// after a reset is swallowed as warm-up.
    pub fn record_frame(&mut self, dt: Duration) -> Option<f32> {
        self.frames += 1;
        self.window += dt;
        let window_sec = self.window.as_secs_f32();
        if window_sec < FPS_SAMPLE_WINDOW_SEC {
            return None;
        }
        let fps = self.frames as f32 / window_sec;
        self.frames = 0;
        self.window = Duration::ZERO;
        if !self.warmed_up {
            self.warmed_up = true;
            return None;
        }
        Some(fps)
    }

    /// Feed one sample. Returns the next tier down once enough consecutive
    /// samples fall below the threshold.
    pub fn evaluate(&mut self, fps: f32, tier: PerformanceTier) -> Option<PerformanceTier> {
        if tier == PerformanceTier::VeryLow {
            self.low_streak = 0;
            return None;
        }
        if fps >= FPS_DEGRADE_BELOW {
            self.low_streak = 0;
            return None;
        }
        self.low_streak += 1;
        if self.low_streak < FPS_LOW_SAMPLES_TO_DEGRADE {
            return None;
        }
        self.low_streak = 0;
        Some(tier.step_down())
    }

    pub fn tick(&mut self, dt: Duration, tier: PerformanceTier) -> Option<PerformanceTier> {
        let fps = self.record_frame(dt)?;
        log::debug!("[fps] measured {:.1} at tier {}", fps, tier);
        self.evaluate(fps, tier)
    }
}
