// Options parsing and palette resolution.

use backdrop_core::*;

#[test]
fn empty_object_uses_defaults() {
    let opts: BackgroundOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(opts, BackgroundOptions::default());
    assert!(opts.respect_reduced_motion);
    assert!(opts.mouse_controls);
    assert_eq!(opts.base_config(), EffectVariant::Dots.default_base());
}

#[test]
fn camel_case_fields_are_recognised() {
    let json = r#"{
        "effect": "birds",
        "engine": "vanta",
        "theme": "dark",
        "palette": { "primary": 16711680, "secondary": 65280, "background": 255 },
        "quantity": 4,
        "speed": 2.5,
        "forceMobileHighPerformance": true,
        "respectReducedMotion": false,
        "className": "hero-bg"
    }"#;
    let opts: BackgroundOptions = serde_json::from_str(json).unwrap();
    assert_eq!(opts.effect, EffectVariant::Birds);
    assert_eq!(opts.engine, EngineKind::Vanta);
    assert_eq!(opts.theme, ThemePreference::Dark);
    assert!(opts.force_mobile_high_performance);
    assert!(!opts.respect_reduced_motion);
    assert_eq!(opts.class_name.as_deref(), Some("hero-bg"));
    let base = opts.base_config();
    assert_eq!(base.quantity, 4.0);
    assert_eq!(base.speed, 2.5);
    assert_eq!(base.cohesion, EffectVariant::Birds.default_base().cohesion);
    // Dark falls back to the explicit palette when no dark palette is given.
    assert_eq!(opts.palette_for(Theme::Dark).primary, 0xff0000);
}

#[test]
fn invalid_overrides_are_ignored() {
    let opts = BackgroundOptions {
        speed: Some(f32::NAN),
        size: Some(-3.0),
        ..Default::default()
    };
    let d = EffectVariant::Dots.default_base();
    assert_eq!(opts.base_config().speed, d.speed);
    assert_eq!(opts.base_config().size, d.size);
}

#[test]
fn theme_resolution() {
    assert_eq!(ThemePreference::Auto.resolve(true), Theme::Dark);
    assert_eq!(ThemePreference::Auto.resolve(false), Theme::Light);
    assert_eq!(ThemePreference::Light.resolve(true), Theme::Light);
    assert_eq!(Theme::parse(" Dark "), Some(Theme::Dark));
    assert_eq!(Theme::parse("sepia"), None);
    assert_eq!(BackgroundOptions::default().palette_for(Theme::Dark), Palette::DARK);
}

#[test]
fn css_hex_formats_packed_colours() {
    assert_eq!(css_hex(0x3b82f6), "#3b82f6");
    assert_eq!(css_hex(0xff), "#0000ff");
    assert_eq!(css_hex(0xff12_3456), "#123456");
}

#[test]
fn recreate_needed_only_for_engine_relevant_changes() {
    let a = BackgroundOptions::default();
    let mut b = a.clone();
    b.class_name = Some("x".into());
    assert!(!a.requires_recreate(&b));
    b.speed = Some(3.0);
    assert!(a.requires_recreate(&b));
}

#[test]
fn engine_names_match_effect_registry() {
    assert_eq!(EffectVariant::Dots.engine_name(), "DOTS");
    assert_eq!(EffectVariant::Net.engine_name(), "NET");
}
