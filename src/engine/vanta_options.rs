// Option object handed to the external engine's effect constructor.
//
// Colours stay packed integers and the physics fields keep the engine's own
// names. The mount element is attached separately by the adapter.

use crate::constants::{THREE_SCRIPT_URL, VANTA_SCRIPT_BASE};
use backdrop_core::{EffectVariant, Palette, RenderParameters};
use serde::Serialize;

/// Whether an uncaught error reported for `filename` came from the external
/// engine's own scripts.
pub fn is_engine_script(filename: &str) -> bool {
    !filename.is_empty() && (filename == THREE_SCRIPT_URL || filename.starts_with(VANTA_SCRIPT_BASE))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VantaOptions {
    pub mouse_controls: bool,
    pub touch_controls: bool,
    pub gyro_controls: bool,
    pub min_height: f32,
    pub min_width: f32,
    pub scale: f32,
    pub scale_mobile: f32,
    pub color: u32,
    pub color2: u32,
    pub background_color: u32,
    pub frame_rate_cap: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bird_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_limit: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cohesion: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_lines: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shininess: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_dots: Option<bool>,
}

impl VantaOptions {
    pub fn build(variant: EffectVariant, palette: &Palette, params: &RenderParameters) -> Self {
        let count = params.particle_count as f32;
        let mut o = VantaOptions {
            mouse_controls: params.features.mouse_follow,
            touch_controls: params.features.mouse_follow,
            gyro_controls: false,
            min_height: 200.0,
            min_width: 200.0,
            scale: 1.0,
            scale_mobile: params.pixel_ratio,
            color: palette.primary,
            color2: palette.secondary,
            background_color: palette.background,
            frame_rate_cap: params.frame_rate_cap.get(),
            quantity: None,
            bird_size: None,
            speed_limit: None,
            separation: None,
            alignment: None,
            cohesion: None,
            size: None,
            spacing: None,
            show_lines: None,
            wave_speed: None,
            wave_height: None,
            shininess: None,
            points: None,
            max_distance: None,
            show_dots: None,
        };
        match variant {
            EffectVariant::Birds => {
                // The birds effect takes 1..=5 as a density exponent.
                o.quantity = Some((count / 12.0).round().clamp(1.0, 5.0) as u32);
                o.bird_size = Some((params.size * 0.4).max(0.1));
                o.speed_limit = Some(params.speed * 3.5);
                o.separation = Some(params.separation);
                o.alignment = Some(params.alignment);
                o.cohesion = Some(params.cohesion);
            }
            EffectVariant::Dots => {
                o.size = Some(params.size);
                o.spacing = Some((3500.0 / count).clamp(10.0, 100.0));
                o.show_lines = Some(params.features.connect_lines);
            }
            EffectVariant::Waves => {
                o.wave_speed = Some(params.speed);
                o.wave_height = Some(params.size * 5.0);
                o.shininess = Some(if params.features.glow { 30.0 } else { 0.0 });
            }
            EffectVariant::Net => {
                o.points = Some((count / 7.0).round().clamp(1.0, 20.0) as u32);
                o.max_distance = Some(20.0);
                o.spacing = Some(params.separation.max(1.0));
                o.show_dots = Some(true);
            }
        }
        o
    }
}
