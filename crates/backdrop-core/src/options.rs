//! Caller-facing configuration of a background instance.
//!
//! Options arrive from JavaScript (either a plain object or JSON in a data
//! attribute), so every field is defaulted and names are camelCase.

use serde::{Deserialize, Serialize};

/// Visual variant. All variants share probing and lifecycle; they differ in
/// option defaults and in how the engine draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectVariant {
    #[default]
    Dots,
    Birds,
    Waves,
    Net,
}

impl EffectVariant {
    /// Effect name as registered by the external engine.
    pub fn engine_name(self) -> &'static str {
        match self {
            EffectVariant::Dots => "DOTS",
            EffectVariant::Birds => "BIRDS",
            EffectVariant::Waves => "WAVES",
            EffectVariant::Net => "NET",
        }
    }

    pub fn default_base(self) -> BaseConfig {
        match self {
            EffectVariant::Dots => BaseConfig {
                quantity: 90.0,
                speed: 1.0,
                separation: 20.0,
                alignment: 10.0,
                cohesion: 10.0,
                size: 3.0,
            },
            EffectVariant::Birds => BaseConfig {
                quantity: 60.0,
                speed: 1.4,
                separation: 20.0,
                alignment: 20.0,
                cohesion: 20.0,
                size: 2.5,
            },
            EffectVariant::Waves => BaseConfig {
                quantity: 120.0,
                speed: 0.8,
                separation: 10.0,
                alignment: 40.0,
                cohesion: 5.0,
                size: 2.0,
            },
            EffectVariant::Net => BaseConfig {
                quantity: 70.0,
                speed: 1.0,
                separation: 25.0,
                alignment: 5.0,
                cohesion: 5.0,
                size: 2.5,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Built-in canvas renderer; always available.
    #[default]
    Native,
    /// External three.js/Vanta engine loaded from a script tag.
    Vanta,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(name: &str) -> Option<Theme> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    /// Follow `prefers-color-scheme`.
    #[default]
    Auto,
}

impl ThemePreference {
    pub fn resolve(self, system_prefers_dark: bool) -> Theme {
        match self {
            ThemePreference::Light => Theme::Light,
            ThemePreference::Dark => Theme::Dark,
            ThemePreference::Auto if system_prefers_dark => Theme::Dark,
            ThemePreference::Auto => Theme::Light,
        }
    }
}

/// Colours packed as `0xRRGGBB`, the format the external engine expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub primary: u32,
    pub secondary: u32,
    pub background: u32,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        primary: 0x3b82f6,
        secondary: 0x06b6d4,
        background: 0xf8fafc,
    };
    pub const DARK: Palette = Palette {
        primary: 0x60a5fa,
        secondary: 0x22d3ee,
        background: 0x0b1120,
    };

    pub fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Light => Palette::LIGHT,
            Theme::Dark => Palette::DARK,
        }
    }
}

/// `#rrggbb` for a packed colour; bits above 24 are ignored.
pub fn css_hex(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

/// Shape and behaviour parameters before degradation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseConfig {
    pub quantity: f32,
    pub speed: f32,
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub size: f32,
}

impl Default for BaseConfig {
    fn default() -> Self {
        EffectVariant::default().default_base()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundOptions {
    pub effect: EffectVariant,
    pub engine: EngineKind,
    pub theme: ThemePreference,
    /// Light-theme palette, also used for dark when `dark_palette` is unset.
    pub palette: Option<Palette>,
    pub dark_palette: Option<Palette>,
    pub quantity: Option<f32>,
    pub speed: Option<f32>,
    pub separation: Option<f32>,
    pub alignment: Option<f32>,
    pub cohesion: Option<f32>,
    pub size: Option<f32>,
    pub force_mobile_high_performance: bool,
    pub respect_reduced_motion: bool,
    pub mouse_controls: bool,
    pub class_name: Option<String>,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            effect: EffectVariant::default(),
            engine: EngineKind::default(),
            theme: ThemePreference::default(),
            palette: None,
            dark_palette: None,
            quantity: None,
            speed: None,
            separation: None,
            alignment: None,
            cohesion: None,
            size: None,
            force_mobile_high_performance: false,
            respect_reduced_motion: true,
            mouse_controls: true,
            class_name: None,
        }
    }
}

impl BackgroundOptions {
    /// Variant defaults with caller overrides applied. Non-finite or
    /// negative overrides are ignored.
    pub fn base_config(&self) -> BaseConfig {
        let d = self.effect.default_base();
        let pick = |v: Option<f32>, fallback: f32| {
            v.filter(|x| x.is_finite() && *x >= 0.0).unwrap_or(fallback)
        };
        BaseConfig {
            quantity: pick(self.quantity, d.quantity),
            speed: pick(self.speed, d.speed),
            separation: pick(self.separation, d.separation),
            alignment: pick(self.alignment, d.alignment),
            cohesion: pick(self.cohesion, d.cohesion),
            size: pick(self.size, d.size),
        }
    }

    pub fn palette_for(&self, theme: Theme) -> Palette {
        match theme {
            Theme::Light => self.palette.unwrap_or(Palette::LIGHT),
            Theme::Dark => self
                .dark_palette
                .or(self.palette)
                .unwrap_or(Palette::DARK),
        }
    }

    /// Whether a change from `self` to `next` needs the engine rebuilt.
    pub fn requires_recreate(&self, next: &BackgroundOptions) -> bool {
        self.effect != next.effect
            || self.engine != next.engine
            || self.base_config() != next.base_config()
            || self.palette != next.palette
            || self.dark_palette != next.dark_palette
            || self.theme != next.theme
            || self.force_mobile_high_performance != next.force_mobile_high_performance
            || self.respect_reduced_motion != next.respect_reduced_motion
            || self.mouse_controls != next.mouse_controls
    }
}
