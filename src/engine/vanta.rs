//! Adapter over the external three.js/Vanta engine.

use super::vanta_options::{is_engine_script, VantaOptions};
use crate::constants::{THREE_SCRIPT_URL, VANTA_SCRIPT_BASE};
use crate::listener::EventListener;
use backdrop_core::{
    BackdropError, EffectVariant, FrameRateCap, Palette, PerformanceTier, RenderParameters,
};
use js_sys::{Function, Object, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn call_method(target: &JsValue, method: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let f = get(target, method)
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or_else(|| JsValue::from_str(&format!("no method `{method}`")))?;
    match args {
        [] => f.call0(target),
        [a] => f.call1(target, a),
        _ => f.apply(target, &args.iter().map(|a| (*a).clone()).collect::<js_sys::Array>()),
    }
}

pub fn vanta_script_url(variant: EffectVariant) -> String {
    format!(
        "{VANTA_SCRIPT_BASE}vanta.{}.min.js",
        variant.engine_name().to_ascii_lowercase()
    )
}

pub struct VantaEngine {
    layer: web::HtmlElement,
    variant: EffectVariant,
    palette: Palette,
    name: String,
}

impl VantaEngine {
    pub fn new(layer: web::HtmlElement, variant: EffectVariant, palette: Palette) -> Self {
        Self {
            layer,
            variant,
            palette,
            name: format!("vanta-{}", variant.engine_name().to_ascii_lowercase()),
        }
    }

    pub fn configure(&mut self, variant: EffectVariant, palette: Palette) {
        self.variant = variant;
        self.palette = palette;
        self.name = format!("vanta-{}", variant.engine_name().to_ascii_lowercase());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn factory(&self) -> Option<Function> {
        let window: JsValue = web::window()?.into();
        get(&window, "THREE")?;
        let vanta = get(&window, "VANTA")?;
        get(&vanta, self.variant.engine_name())?.dyn_into::<Function>().ok()
    }

    pub fn is_loaded(&self) -> bool {
        self.factory().is_some()
    }

    /// Append the three.js and effect script tags unless already present.
    /// Tags are non-async so three.js evaluates first.
    pub fn inject_scripts(&self, document: &web::Document) {
        let has_three = web::window()
            .map(|w| {
                let w: JsValue = w.into();
                get(&w, "THREE").is_some()
            })
            .unwrap_or(false);
        if !has_three {
            append_script(document, THREE_SCRIPT_URL);
        }
        append_script(document, &vanta_script_url(self.variant));
    }

    pub fn create(
        &mut self,
        tier: PerformanceTier,
        params: &RenderParameters,
    ) -> Result<VantaHandle, BackdropError> {
        let factory = self.factory().ok_or_else(|| BackdropError::EngineUnavailable {
            effect: self.name.clone(),
        })?;
        let fail = |reason: String| BackdropError::EngineConstruction {
            effect: self.name.clone(),
            tier,
            reason,
        };
        let options = VantaOptions::build(self.variant, &self.palette, params);
        // Same serde path as option parsing in lib.rs: wasm-bindgen's
        // `serde-serialize` feature, no extra bridge crate.
        #[allow(deprecated)]
        let opts = JsValue::from_serde(&options).map_err(|e| fail(e.to_string()))?;
        Reflect::set(&opts, &JsValue::from_str("el"), &self.layer).map_err(|e| fail(format!("{:?}", e)))?;
        let handle = factory
            .call1(&JsValue::NULL, &opts)
            .map_err(|e| fail(format!("{:?}", e)))?;
        if !handle.is_object() {
            return Err(fail("constructor returned no instance".into()));
        }
        let failure: Rc<RefCell<Option<BackdropError>>> = Rc::new(RefCell::new(None));
        let error_listener = watch_engine_errors(&self.name, &failure);
        Ok(VantaHandle {
            handle,
            name: self.name.clone(),
            failure,
            error_listener: error_listener,
            destroyed: false,
        })
    }
}

/// The engine draws from its own rAF callbacks, so its exceptions only
/// surface as window `error` events.
fn watch_engine_errors(
    name: &str,
    failure: &Rc<RefCell<Option<BackdropError>>>,
) -> Option<EventListener> {
    let window = web::window()?;
    let failure = failure.clone();
    let effect = name.to_string();
    EventListener::new(&window, "error", move |ev| {
        let Some(err) = ev.dyn_ref::<web::ErrorEvent>() else {
            return;
        };
        if !is_engine_script(&err.filename()) {
            return;
        }
        let mut slot = failure.borrow_mut();
        if slot.is_none() {
            *slot = Some(BackdropError::EngineRuntime {
                effect: effect.clone(),
                reason: err.message(),
            });
        }
    })
    .map_err(|e| log::warn!("[engine] {} error watch unavailable: {}", name, e))
    .ok()
}

fn append_script(document: &web::Document, src: &str) {
    let selector = format!("script[src=\"{src}\"]");
    if let Ok(Some(_)) = document.query_selector(&selector) {
        return;
    }
    let script = match document
        .create_element("script")
        .ok()
        .and_then(|el| el.dyn_into::<web::HtmlScriptElement>().ok())
    {
        Some(s) => s,
        None => return,
    };
    script.set_src(src);
    script.set_async(false);
    // CORS mode so error events carry the real filename and message.
    script.set_cross_origin(Some("anonymous"));
    let parent: Option<web::Node> = document
        .head()
        .map(Into::into)
        .or_else(|| document.body().map(Into::into));
    if let Some(parent) = parent {
        match parent.append_child(&script) {
            Ok(_) => log::info!("[engine] injected {}", src),
            Err(e) => log::warn!("[engine] could not inject {}: {:?}", src, e),
        }
    }
}

pub struct VantaHandle {
    handle: JsValue,
    name: String,
    failure: Rc<RefCell<Option<BackdropError>>>,
    error_listener: Option<EventListener>,
    destroyed: bool,
}

impl VantaHandle {
    pub fn take_failure(&mut self) -> Option<BackdropError> {
        self.failure.borrow_mut().take()
    }

    pub fn set_frame_rate(&mut self, cap: FrameRateCap) {
        if self.destroyed {
            return;
        }
        let update = Object::new();
        _ = Reflect::set(
            &update,
            &JsValue::from_str("frameRateCap"),
            &JsValue::from_f64(cap.get() as f64),
        );
        if let Err(e) = call_method(&self.handle, "setOptions", &[&update]) {
            log::warn!("[engine] {} setOptions failed: {:?}", self.name, e);
        }
    }

    pub fn resize(&mut self) {
        if self.destroyed {
            return;
        }
        if let Err(e) = call_method(&self.handle, "resize", &[]) {
            log::warn!("[engine] {} resize failed: {:?}", self.name, e);
        }
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.error_listener.take();
        if let Err(e) = call_method(&self.handle, "destroy", &[]) {
            log::warn!("[engine] {} destroy failed: {:?}", self.name, e);
        }
    }
}

impl Drop for VantaHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}
