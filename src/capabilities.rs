//! Browser-side capability detection.
//!
//! Every read is best effort: a missing API leaves the field `None` and the
//! prober falls back to its mid-range assumptions. Non-standard navigator
//! properties are read reflectively so their absence never throws.

use crate::constants::*;
use backdrop_core::{DeviceCapabilities, WebGlProbe};
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Full snapshot including the one-off WebGL probe.
pub fn detect(window: &web::Window) -> DeviceCapabilities {
    let navigator = window.navigator();
    let mut caps = DeviceCapabilities {
        user_agent: navigator.user_agent().ok(),
        device_memory_gb: get(&navigator, "deviceMemory").and_then(|v| v.as_f64()),
        hardware_concurrency: Some(navigator.hardware_concurrency() as u32).filter(|c| *c > 0),
        ..Default::default()
    };
    if let Some(document) = window.document() {
        let (webgl, renderer) = probe_webgl(&document);
        caps.webgl = webgl;
        caps.gpu_renderer = renderer;
    }
    refresh(window, &mut caps);
    caps
}

/// Re-read the signals that change during a session (viewport, network,
/// motion preference). GPU and battery fields are left alone.
pub fn refresh(window: &web::Window, caps: &mut DeviceCapabilities) {
    caps.viewport_width = window.inner_width().ok().and_then(|v| v.as_f64());
    caps.prefers_reduced_motion = media_matches(window, REDUCED_MOTION_QUERY);
    match connection(window) {
        Some(conn) => {
            caps.save_data = get(&conn, "saveData").and_then(|v| v.as_bool());
            caps.effective_connection_type = get(&conn, "effectiveType").and_then(|v| v.as_string());
        }
        None => {
            caps.save_data = None;
            caps.effective_connection_type = None;
        }
    }
}

pub fn media_query(window: &web::Window, query: &str) -> Option<web::MediaQueryList> {
    window.match_media(query).ok().flatten()
}

pub fn media_matches(window: &web::Window, query: &str) -> Option<bool> {
    media_query(window, query).map(|m| m.matches())
}

pub fn prefers_dark(window: &web::Window) -> bool {
    media_matches(window, DARK_SCHEME_QUERY).unwrap_or(false)
}

/// `navigator.connection` as an event target, where supported.
pub fn connection(window: &web::Window) -> Option<web::EventTarget> {
    get(&window.navigator(), "connection").map(|c| c.unchecked_into::<web::EventTarget>())
}

/// Battery manager plus its current level and charging flag.
pub struct BatteryStatus {
    pub manager: web::EventTarget,
    pub level: Option<f64>,
    pub charging: Option<bool>,
}

impl BatteryStatus {
    pub fn read(manager: web::EventTarget) -> Self {
        let level = get(&manager, "level").and_then(|v| v.as_f64());
        let charging = get(&manager, "charging").and_then(|v| v.as_bool());
        Self {
            manager,
            level,
            charging,
        }
    }
}

pub async fn battery(window: &web::Window) -> Option<BatteryStatus> {
    let navigator = window.navigator();
    let get_battery = get(&navigator, "getBattery")?.dyn_into::<js_sys::Function>().ok()?;
    let promise = get_battery
        .call0(&navigator)
        .ok()?
        .dyn_into::<js_sys::Promise>()
        .ok()?;
    let manager = JsFuture::from(promise).await.ok()?;
    Some(BatteryStatus::read(manager.unchecked_into()))
}

/// Create a throwaway canvas, read the renderer string and release the
/// context again.
fn probe_webgl(document: &web::Document) -> (WebGlProbe, Option<String>) {
    let canvas = match document
        .create_element("canvas")
        .ok()
        .and_then(|el| el.dyn_into::<web::HtmlCanvasElement>().ok())
    {
        Some(c) => c,
        None => return (WebGlProbe::Skipped, None),
    };
    let ctx = match canvas.get_context("webgl") {
        Ok(Some(ctx)) => Some(ctx),
        Ok(None) => match canvas.get_context("experimental-webgl") {
            Ok(ctx) => ctx,
            Err(e) => return (WebGlProbe::Failed(format!("{:?}", e)), None),
        },
        Err(e) => {
            log::warn!("[probe] WebGL context creation threw: {:?}", e);
            return (WebGlProbe::Failed(format!("{:?}", e)), None);
        }
    };
    let gl = match ctx.and_then(|c| c.dyn_into::<web::WebGlRenderingContext>().ok()) {
        Some(gl) => gl,
        None => return (WebGlProbe::Unavailable, None),
    };
    let renderer = match gl.get_extension("WEBGL_debug_renderer_info") {
        Ok(Some(_)) => gl.get_parameter(UNMASKED_RENDERER_WEBGL).ok(),
        _ => gl.get_parameter(RENDERER_WEBGL).ok(),
    }
    .and_then(|v| v.as_string());
    if let Ok(Some(lose)) = gl.get_extension("WEBGL_lose_context") {
        if let Some(f) = get(&lose, "loseContext").and_then(|f| f.dyn_into::<js_sys::Function>().ok()) {
            _ = f.call0(&lose);
        }
    }
    (WebGlProbe::Available, renderer)
}
