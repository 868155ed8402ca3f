// Host-side tests for the option object passed to the external engine.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod vanta_options {
    include!("../src/engine/vanta_options.rs");
}

use backdrop_core::{compute_parameters, EffectVariant, Palette, PerformanceTier};
use serde_json::Value;
use vanta_options::{is_engine_script, VantaOptions};

fn json(variant: EffectVariant, tier: PerformanceTier) -> Value {
    let params = compute_parameters(tier, &variant.default_base(), false, false);
    serde_json::to_value(VantaOptions::build(variant, &Palette::DARK, &params)).unwrap()
}

#[test]
fn common_fields_use_engine_names() {
    let v = json(EffectVariant::Dots, PerformanceTier::High);
    assert_eq!(v["color"], Palette::DARK.primary);
    assert_eq!(v["color2"], Palette::DARK.secondary);
    assert_eq!(v["backgroundColor"], Palette::DARK.background);
    assert_eq!(v["frameRateCap"], 60);
    assert_eq!(v["gyroControls"], false);
    assert_eq!(v["mouseControls"], true);
    assert_eq!(v["scaleMobile"], 2.0);
    assert!(v.get("el").is_none());
}

#[test]
fn unused_variant_fields_are_omitted() {
    let v = json(EffectVariant::Dots, PerformanceTier::High);
    assert!(v.get("birdSize").is_none());
    assert!(v.get("waveHeight").is_none());
    assert!(v.get("points").is_none());
    assert_eq!(v["showLines"], true);
}

#[test]
fn birds_quantity_stays_in_engine_range() {
    for tier in PerformanceTier::ALL {
        let q = json(EffectVariant::Birds, tier)["quantity"].as_u64().unwrap();
        assert!((1..=5).contains(&q), "{tier}: {q}");
    }
}

#[test]
fn low_tiers_drop_mouse_and_lines() {
    let v = json(EffectVariant::Dots, PerformanceTier::VeryLow);
    assert_eq!(v["mouseControls"], false);
    assert_eq!(v["touchControls"], false);
    assert_eq!(v["showLines"], false);
    assert_eq!(v["frameRateCap"], 30);
}

#[test]
fn waves_shine_only_with_glow() {
    assert_eq!(json(EffectVariant::Waves, PerformanceTier::High)["shininess"], 30.0);
    assert_eq!(json(EffectVariant::Waves, PerformanceTier::Medium)["shininess"], 0.0);
}

#[test]
fn net_points_are_bounded() {
    for tier in PerformanceTier::ALL {
        let p = json(EffectVariant::Net, tier)["points"].as_u64().unwrap();
        assert!((1..=20).contains(&p));
    }
}

#[test]
fn engine_errors_are_recognised_by_script_url() {
    assert!(is_engine_script(constants::THREE_SCRIPT_URL));
    assert!(is_engine_script(&format!(
        "{}vanta.birds.min.js",
        constants::VANTA_SCRIPT_BASE
    )));
    assert!(!is_engine_script(""));
    assert!(!is_engine_script("https://example.com/app.js"));
    assert!(!is_engine_script("https://cdn.jsdelivr.net/npm/other@1.0.0/dist/x.js"));
}
