use crate::constants::VISIBILITY_THRESHOLD;
use crate::dom::js_err;
use crate::listener::EventListener;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Intersection observer on the mount node plus a `visibilitychange`
/// listener on the document. Disconnected on drop.
pub struct VisibilityObservers {
    observer: web::IntersectionObserver,
    _on_intersect: Closure<dyn FnMut(js_sys::Array, web::IntersectionObserver)>,
    _on_visibility: EventListener,
}

impl VisibilityObservers {
    pub fn observe(
        target: &web::Element,
        document: &web::Document,
        mut on_viewport: impl FnMut(bool) + 'static,
        mut on_tab: impl FnMut(bool) + 'static,
    ) -> anyhow::Result<Self> {
        let on_intersect = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _obs: web::IntersectionObserver| {
                // Only the latest entry matters.
                let last = entries.get(entries.length().saturating_sub(1));
                if let Ok(entry) = last.dyn_into::<web::IntersectionObserverEntry>() {
                    on_viewport(entry.is_intersecting());
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, web::IntersectionObserver)>);
        let init = web::IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(VISIBILITY_THRESHOLD));
        let observer =
            web::IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &init)
                .map_err(js_err)?;
        observer.observe(target);

        let doc = document.clone();
        let on_visibility = EventListener::new(document, "visibilitychange", move |_| {
            on_tab(!doc.hidden());
        })?;

        Ok(Self {
            observer,
            _on_intersect: on_intersect,
            _on_visibility: on_visibility,
        })
    }
}

impl Drop for VisibilityObservers {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
