#![cfg(target_arch = "wasm32")]
use backdrop_core::BackgroundOptions;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

mod background;
mod capabilities;
mod constants;
mod dom;
mod engine;
mod frame;
mod listener;
mod style;
mod visibility;

use background::Background;
use constants::{AUTO_MOUNT_ATTR, OPTIONS_ATTR};

thread_local! {
    // Backgrounds created by the page-load scan live as long as the page.
    static AUTO_MOUNTED: RefCell<Vec<Background>> = RefCell::new(Vec::new());
}

fn to_js_error(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{e:#}"))
}

fn parse_options(options: &JsValue) -> Result<BackgroundOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(BackgroundOptions::default());
    }
    // wasm-bindgen's `serde-serialize` feature; keeps the JS bridge on the
    // crates already in the tree.
    #[allow(deprecated)]
    options.into_serde::<BackgroundOptions>().map_err(|e| {
        to_js_error(backdrop_core::BackdropError::InvalidOptions(e.to_string()).into())
    })
}

fn options_from_attr(el: &web::Element) -> BackgroundOptions {
    match el.get_attribute(OPTIONS_ATTR) {
        Some(raw) if !raw.trim().is_empty() => match serde_json::from_str(&raw) {
            Ok(options) => options,
            Err(e) => {
                log::warn!("[lifecycle] ignoring bad {OPTIONS_ATTR}: {e}");
                BackgroundOptions::default()
            }
        },
        _ => BackgroundOptions::default(),
    }
}

fn auto_mount() {
    let Some(document) = dom::window_document() else { return };
    let Ok(nodes) = document.query_selector_all(&format!("[{AUTO_MOUNT_ATTR}]")) else {
        return;
    };
    for i in 0..nodes.length() {
        let Some(el) = nodes
            .item(i)
            .and_then(|n| n.dyn_into::<web::HtmlElement>().ok())
        else {
            continue;
        };
        let options = options_from_attr(&el);
        match Background::mount(el, options) {
            Ok(bg) => AUTO_MOUNTED.with(|m| m.borrow_mut().push(bg)),
            Err(e) => log::error!("[lifecycle] auto-mount failed: {e:#}"),
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Info);
    auto_mount();
    Ok(())
}

/// Animated backdrop mounted behind the children of a container element.
#[wasm_bindgen]
pub struct AnimatedBackground {
    inner: Background,
}

#[wasm_bindgen]
impl AnimatedBackground {
    /// Mount into `container`. `options` is a plain object; omitted fields
    /// take their defaults.
    pub fn mount(container: web::HtmlElement, options: JsValue) -> Result<AnimatedBackground, JsValue> {
        let options = parse_options(&options)?;
        let inner = Background::mount(container, options).map_err(to_js_error)?;
        Ok(AnimatedBackground { inner })
    }

    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(&self, options: JsValue) -> Result<(), JsValue> {
        self.inner.set_options(parse_options(&options)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, theme: &str) -> Result<(), JsValue> {
        self.inner.set_theme(theme).map_err(to_js_error)
    }

    pub fn unmount(&self) {
        self.inner.unmount();
    }

    #[wasm_bindgen(getter, js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }
}
