use anyhow::anyhow;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn js_err(e: wasm_bindgen::JsValue) -> anyhow::Error {
    anyhow!("{:?}", e)
}

pub fn create_div(document: &web::Document, class: &str) -> anyhow::Result<web::HtmlElement> {
    let el = document
        .create_element("div")
        .map_err(js_err)?
        .dyn_into::<web::HtmlElement>()
        .map_err(|e| anyhow!("{:?}", e))?;
    el.set_class_name(class);
    Ok(el)
}

pub fn set_style(el: &web::Element, css: &str) {
    _ = el.set_attribute("style", css);
}

/// Move every child of `from` into `into`, preserving order.
pub fn move_children(from: &web::Node, into: &web::Node) {
    while let Some(child) = from.first_child() {
        if into.append_child(&child).is_err() {
            break;
        }
    }
}

/// Match the canvas backing store to its CSS box times the device pixel
/// ratio, capped at `max_ratio`. Returns the CSS size and the ratio used.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, max_ratio: f32) -> (f64, f64, f64) {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    let ratio = dpr.min(max_ratio as f64).max(0.25);
    let rect = canvas.get_bounding_client_rect();
    let w_px = (rect.width() * ratio) as u32;
    let h_px = (rect.height() * ratio) as u32;
    canvas.set_width(w_px.max(1));
    canvas.set_height(h_px.max(1));
    (rect.width().max(1.0), rect.height().max(1.0), ratio)
}
