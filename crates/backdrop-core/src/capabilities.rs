//! Device capability snapshot.
//!
//! Every platform signal is optional. The browser layer fills in what it can
//! and leaves the rest as `None`; the helpers here turn a snapshot into the
//! boolean risk signals the prober consumes, substituting mid-range defaults
//! for anything unknown.

use crate::constants::*;
use serde::{Deserialize, Serialize};

const MOBILE_UA_TOKENS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
    "mobile",
];

const WEAK_GPU_TOKENS: &[&str] = &[
    "mali",
    "adreno (tm) 3",
    "adreno (tm) 4",
    "adreno (tm) 5",
    "adreno 3",
    "adreno 4",
    "adreno 5",
    "powervr",
    "intel hd",
    "intel(r) hd",
    "intel uhd",
    "intel(r) uhd",
    "swiftshader",
    "llvmpipe",
    "software",
];

const SLOW_CONNECTION_TYPES: &[&str] = &["slow-2g", "2g", "3g"];

/// Outcome of the throwaway-canvas WebGL probe.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WebGlProbe {
    /// Not attempted (non-browser host, or probing disabled).
    #[default]
    Skipped,
    Available,
    Unavailable,
    /// Context creation threw.
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub user_agent: Option<String>,
    pub device_memory_gb: Option<f64>,
    pub hardware_concurrency: Option<u32>,
    pub gpu_renderer: Option<String>,
    pub webgl: WebGlProbe,
    pub save_data: Option<bool>,
    pub effective_connection_type: Option<String>,
    pub battery_level: Option<f64>,
    pub battery_charging: Option<bool>,
    pub prefers_reduced_motion: Option<bool>,
    pub viewport_width: Option<f64>,
}

impl DeviceCapabilities {
    pub fn is_mobile(&self) -> bool {
        self.user_agent
            .as_deref()
            .map(is_mobile_user_agent)
            .unwrap_or(false)
    }

    pub fn is_old_mobile_os(&self) -> bool {
        self.user_agent
            .as_deref()
            .map(is_old_mobile_os)
            .unwrap_or(false)
    }

    pub fn memory_gb(&self) -> f64 {
        self.device_memory_gb
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(DEFAULT_MEMORY_GB)
    }

    pub fn cores(&self) -> u32 {
        self.hardware_concurrency
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_CORE_COUNT)
    }

    pub fn has_low_memory(&self) -> bool {
        self.memory_gb() <= LOW_MEMORY_GB
    }

    pub fn has_low_cores(&self) -> bool {
        self.cores() <= LOW_CORE_COUNT
    }

    pub fn has_moderate_constraints(&self) -> bool {
        self.memory_gb() <= MODERATE_MEMORY_GB || self.cores() <= MODERATE_CORE_COUNT
    }

    pub fn has_weak_gpu(&self) -> bool {
        match self.gpu_renderer.as_deref() {
            Some(renderer) => {
                is_weak_gpu(renderer)
                    || (self.is_mobile() && renderer.to_ascii_lowercase().contains("apple gpu"))
            }
            None => false,
        }
    }

    pub fn has_slow_network(&self) -> bool {
        if self.save_data == Some(true) {
            return true;
        }
        self.effective_connection_type
            .as_deref()
            .map(|t| SLOW_CONNECTION_TYPES.contains(&t.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    pub fn has_low_battery(&self) -> bool {
        match (self.battery_level, self.battery_charging) {
            (Some(level), charging) => level < LOW_BATTERY_LEVEL && charging != Some(true),
            (None, _) => false,
        }
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        self.prefers_reduced_motion.unwrap_or(false)
    }

    pub fn has_small_viewport(&self) -> bool {
        self.viewport_width
            .map(|w| w > 0.0 && w < SMALL_VIEWPORT_PX)
            .unwrap_or(false)
    }

    pub fn webgl_failed(&self) -> bool {
        matches!(self.webgl, WebGlProbe::Failed(_))
    }
}

pub fn is_mobile_user_agent(ua: &str) -> bool {
    let ua = ua.to_ascii_lowercase();
    MOBILE_UA_TOKENS.iter().any(|t| ua.contains(t))
}

pub fn is_weak_gpu(renderer: &str) -> bool {
    let r = renderer.to_ascii_lowercase();
    WEAK_GPU_TOKENS.iter().any(|t| r.contains(t))
}

/// Android 7 and older, iOS 12 and older.
pub fn is_old_mobile_os(ua: &str) -> bool {
    let ua = ua.to_ascii_lowercase();
    if let Some(major) = version_after(&ua, "android ") {
        return major <= OLD_ANDROID_MAJOR;
    }
    for marker in ["iphone os ", "cpu os "] {
        if let Some(major) = version_after(&ua, marker) {
            return major <= OLD_IOS_MAJOR;
        }
    }
    false
}

fn version_after(haystack: &str, marker: &str) -> Option<u32> {
    let start = haystack.find(marker)? + marker.len();
    let digits: String = haystack[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_after_reads_major_only() {
        assert_eq!(version_after("android 6.0.1; nexus", "android "), Some(6));
        assert_eq!(version_after("iphone os 12_4 like", "iphone os "), Some(12));
        assert_eq!(version_after("android ; x", "android "), None);
    }
}
