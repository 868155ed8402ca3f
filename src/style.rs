// Inline CSS for the generated elements.
//
// Kept free of browser bindings so it can be tested on the host.

use crate::constants::{LAYER_Z_INDEX, SLOT_Z_INDEX};
use backdrop_core::{css_hex, Palette};

/// Container keeps any inline style the page set and adds positioning.
pub fn container_style(existing: Option<&str>) -> String {
    let base = existing.unwrap_or("").trim().trim_end_matches(';');
    let extra = "position: relative; overflow: hidden;";
    if base.is_empty() {
        extra.to_string()
    } else {
        format!("{base}; {extra}")
    }
}

/// Full-bleed effect layer. It only receives pointer events when the engine
/// reacts to the mouse through the element itself.
pub fn layer_style(interactive: bool, background: &str) -> String {
    format!(
        "position: absolute; inset: 0; z-index: {LAYER_Z_INDEX}; pointer-events: {}; background: {background};",
        if interactive { "auto" } else { "none" }
    )
}

pub fn slot_style() -> String {
    format!("position: relative; z-index: {SLOT_Z_INDEX};")
}

pub fn canvas_style() -> &'static str {
    "position: absolute; inset: 0; width: 100%; height: 100%; display: block;"
}

/// Non-animated substitute: a diagonal gradient in the palette colours.
pub fn static_backdrop(palette: &Palette) -> String {
    format!(
        "linear-gradient(135deg, {} 0%, {} 60%, {} 100%)",
        css_hex(palette.background),
        css_hex(palette.background),
        css_hex(palette.secondary)
    )
}

/// Plain background under a running animation.
pub fn animated_backdrop(palette: &Palette) -> String {
    css_hex(palette.background)
}

/// `rgba(...)` for a packed colour and an alpha in 0..=1.
pub fn rgba(color: u32, alpha: f32) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (color >> 16) & 0xff,
        (color >> 8) & 0xff,
        color & 0xff,
        alpha.clamp(0.0, 1.0)
    )
}
