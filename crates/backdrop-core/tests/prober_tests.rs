// Capability prober: tier classification from device snapshots.

use backdrop_core::*;

const ANDROID_OLD: &str =
    "Mozilla/5.0 (Linux; Android 6.0.1; SM-J500F) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0 Mobile Safari/537.36";
const ANDROID_NEW: &str =
    "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";
const IPHONE_OLD: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 12_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/12.1 Mobile/15E148 Safari/604.1";
const DESKTOP: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

fn desktop(memory: f64, cores: u32) -> DeviceCapabilities {
    DeviceCapabilities {
        user_agent: Some(DESKTOP.into()),
        device_memory_gb: Some(memory),
        hardware_concurrency: Some(cores),
        gpu_renderer: Some("ANGLE (NVIDIA GeForce RTX 3070)".into()),
        webgl: WebGlProbe::Available,
        viewport_width: Some(1440.0),
        ..Default::default()
    }
}

fn mobile(ua: &str, memory: f64, cores: u32) -> DeviceCapabilities {
    DeviceCapabilities {
        user_agent: Some(ua.into()),
        device_memory_gb: Some(memory),
        hardware_concurrency: Some(cores),
        webgl: WebGlProbe::Available,
        viewport_width: Some(390.0),
        ..Default::default()
    }
}

#[test]
fn high_end_desktop_is_high() {
    let caps = desktop(16.0, 12);
    assert_eq!(probe(&caps, false), PerformanceTier::High);
}

#[test]
fn low_end_mobile_is_very_low() {
    let caps = mobile(ANDROID_NEW, 1.0, 2);
    assert_eq!(probe(&caps, false), PerformanceTier::VeryLow);
}

#[test]
fn low_memory_and_low_cores_on_desktop_is_very_low() {
    assert_eq!(probe(&desktop(2.0, 2), false), PerformanceTier::VeryLow);
}

#[test]
fn old_mobile_os_with_two_risks_is_very_low() {
    let mut caps = mobile(ANDROID_OLD, 3.0, 8);
    caps.save_data = Some(true);
    caps.gpu_renderer = Some("Mali-T720".into());
    assert_eq!(probe(&caps, false), PerformanceTier::VeryLow);

    let mut ios = mobile(IPHONE_OLD, 3.0, 6);
    ios.prefers_reduced_motion = Some(true);
    ios.effective_connection_type = Some("3g".into());
    assert_eq!(probe(&ios, false), PerformanceTier::VeryLow);
}

#[test]
fn mobile_with_moderate_constraints_is_low() {
    assert_eq!(probe(&mobile(ANDROID_NEW, 4.0, 8), false), PerformanceTier::Low);
}

#[test]
fn capable_mobile_is_medium() {
    assert_eq!(probe(&mobile(ANDROID_NEW, 8.0, 8), false), PerformanceTier::Medium);
}

#[test]
fn forced_high_performance_on_mobile_short_circuits() {
    let caps = mobile(ANDROID_NEW, 1.0, 2);
    let report = probe_report(&caps, true);
    assert_eq!(report.tier, PerformanceTier::High);
    assert!(report.forced);
    assert!(report.is_mobile);
}

#[test]
fn force_flag_is_ignored_on_desktop() {
    assert_eq!(probe(&desktop(2.0, 2), true), PerformanceTier::VeryLow);
}

#[test]
fn webgl_failure_is_very_low() {
    let mut caps = desktop(16.0, 12);
    caps.webgl = WebGlProbe::Failed("context lost".into());
    assert_eq!(probe(&caps, false), PerformanceTier::VeryLow);
}

#[test]
fn missing_signals_assume_mid_tier() {
    let caps = DeviceCapabilities {
        user_agent: Some(DESKTOP.into()),
        ..Default::default()
    };
    assert_eq!(probe(&caps, false), PerformanceTier::Medium);
    assert_eq!(probe(&DeviceCapabilities::default(), false), PerformanceTier::Medium);
}

#[test]
fn single_desktop_risk_is_medium_and_two_are_low() {
    let mut caps = desktop(16.0, 12);
    caps.gpu_renderer = Some("Intel(R) UHD Graphics 620".into());
    assert_eq!(probe(&caps, false), PerformanceTier::Medium);
    caps.battery_level = Some(0.1);
    caps.battery_charging = Some(false);
    assert_eq!(probe(&caps, false), PerformanceTier::Low);
}

#[test]
fn charging_battery_is_not_a_risk() {
    let mut caps = desktop(16.0, 12);
    caps.battery_level = Some(0.05);
    caps.battery_charging = Some(true);
    assert_eq!(probe(&caps, false), PerformanceTier::High);
}

#[test]
fn small_desktop_viewport_is_a_weak_signal() {
    let mut caps = desktop(16.0, 12);
    caps.viewport_width = Some(700.0);
    assert_eq!(probe(&caps, false), PerformanceTier::Medium);
}

#[test]
fn probe_is_deterministic() {
    let mut caps = mobile(IPHONE_OLD, 2.0, 4);
    caps.gpu_renderer = Some("Apple GPU".into());
    let first = probe_report(&caps, false);
    let second = probe_report(&caps, false);
    assert_eq!(first, second);
}

#[test]
fn user_agent_helpers() {
    assert!(is_mobile_user_agent(ANDROID_NEW));
    assert!(is_mobile_user_agent(IPHONE_OLD));
    assert!(!is_mobile_user_agent(DESKTOP));
    assert!(is_old_mobile_os(ANDROID_OLD));
    assert!(is_old_mobile_os(IPHONE_OLD));
    assert!(!is_old_mobile_os(ANDROID_NEW));
    assert!(!is_old_mobile_os(DESKTOP));
}

#[test]
fn weak_gpu_matching_is_case_insensitive() {
    assert!(is_weak_gpu("Mali-G52"));
    assert!(is_weak_gpu("Google SwiftShader"));
    assert!(is_weak_gpu("Adreno (TM) 506"));
    assert!(!is_weak_gpu("Adreno (TM) 740"));
    assert!(!is_weak_gpu("NVIDIA GeForce RTX 4090"));
}
