//! Capability prober: maps a [`DeviceCapabilities`] snapshot to a tier.
//!
//! The mapping is a pure function of the snapshot and the force flag, so the
//! same inputs always produce the same tier. When rules disagree the lower
//! tier wins.

use crate::capabilities::DeviceCapabilities;
use crate::tier::PerformanceTier;

/// Individual risk signals, kept for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RiskSignals {
    pub low_memory: bool,
    pub low_cores: bool,
    pub weak_gpu: bool,
    pub slow_network: bool,
    pub reduced_motion: bool,
    pub low_battery: bool,
    pub small_viewport: bool,
    pub old_mobile_os: bool,
    pub moderate_constraints: bool,
    pub webgl_failed: bool,
}

impl RiskSignals {
    pub fn from_capabilities(caps: &DeviceCapabilities) -> Self {
        Self {
            low_memory: caps.has_low_memory(),
            low_cores: caps.has_low_cores(),
            weak_gpu: caps.has_weak_gpu(),
            slow_network: caps.has_slow_network(),
            reduced_motion: caps.prefers_reduced_motion(),
            low_battery: caps.has_low_battery(),
            small_viewport: caps.has_small_viewport(),
            old_mobile_os: caps.is_old_mobile_os(),
            moderate_constraints: caps.has_moderate_constraints(),
            webgl_failed: caps.webgl_failed(),
        }
    }

    /// Number of strong risk signals. Viewport width is a weak signal and is
    /// not counted here.
    pub fn strong_count(&self) -> u32 {
        [
            self.low_memory,
            self.low_cores,
            self.weak_gpu,
            self.slow_network,
            self.reduced_motion,
            self.low_battery,
        ]
        .iter()
        .filter(|s| **s)
        .count() as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeReport {
    pub tier: PerformanceTier,
    pub is_mobile: bool,
    pub forced: bool,
    pub signals: RiskSignals,
}

pub fn probe(caps: &DeviceCapabilities, force_high_performance: bool) -> PerformanceTier {
    probe_report(caps, force_high_performance).tier
}

pub fn probe_report(caps: &DeviceCapabilities, force_high_performance: bool) -> ProbeReport {
    let is_mobile = caps.is_mobile();
    let signals = RiskSignals::from_capabilities(caps);
    let forced = is_mobile && force_high_performance;
    let tier = if forced {
        PerformanceTier::High
    } else {
        classify(is_mobile, &signals)
    };
    ProbeReport {
        tier,
        is_mobile,
        forced,
        signals,
    }
}

fn classify(is_mobile: bool, s: &RiskSignals) -> PerformanceTier {
    if s.webgl_failed {
        return PerformanceTier::VeryLow;
    }
    let strong = s.strong_count();
    if (s.old_mobile_os && strong >= 2) || (s.low_memory && s.low_cores) {
        return PerformanceTier::VeryLow;
    }
    if is_mobile {
        if s.moderate_constraints || s.weak_gpu || s.old_mobile_os || strong >= 2 {
            return PerformanceTier::Low;
        }
        return PerformanceTier::Medium;
    }
    if strong >= 2 {
        return PerformanceTier::Low;
    }
    if strong == 1 || s.moderate_constraints || s.small_viewport {
        return PerformanceTier::Medium;
    }
    PerformanceTier::High
}
