//! Scoped browser registrations.
//!
//! Each guard owns its closure and undoes the registration on drop, so a
//! background instance releases everything it registered when it goes away
//! and instances never share a listener.

use crate::dom::js_err;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct EventListener {
    target: web::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl EventListener {
    pub fn new(
        target: &web::EventTarget,
        event: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> anyhow::Result<Self> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

pub struct Timeout {
    id: i32,
    _closure: Closure<dyn FnMut()>,
}

impl Timeout {
    pub fn new(delay_ms: i32, handler: impl FnMut() + 'static) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
        let id = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay_ms,
            )
            .map_err(js_err)?;
        Ok(Self {
            id,
            _closure: closure,
        })
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(w) = web::window() {
            w.clear_timeout_with_handle(self.id);
        }
    }
}

enum IdleId {
    Idle(u32),
    Timer(i32),
}

/// `requestIdleCallback`, or a short timeout where the browser lacks it.
pub struct IdleCallback {
    id: IdleId,
    _closure: Closure<dyn FnMut()>,
}

impl IdleCallback {
    pub fn new(fallback_delay_ms: i32, handler: impl FnMut() + 'static) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
        let id = match window.request_idle_callback(closure.as_ref().unchecked_ref()) {
            Ok(id) => IdleId::Idle(id),
            Err(_) => IdleId::Timer(
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        closure.as_ref().unchecked_ref(),
                        fallback_delay_ms,
                    )
                    .map_err(js_err)?,
            ),
        };
        Ok(Self {
            id,
            _closure: closure,
        })
    }
}

impl Drop for IdleCallback {
    fn drop(&mut self) {
        if let Some(w) = web::window() {
            match self.id {
                IdleId::Idle(id) => w.cancel_idle_callback(id),
                IdleId::Timer(id) => w.clear_timeout_with_handle(id),
            }
        }
    }
}
