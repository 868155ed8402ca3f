use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

struct LoopShared {
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
    request: Cell<Option<i32>>,
    running: Cell<bool>,
}

impl LoopShared {
    fn schedule(&self) {
        if self.request.get().is_some() {
            return;
        }
        let Some(w) = web::window() else { return };
        if let Some(tick) = self.tick.borrow().as_ref() {
            if let Ok(id) = w.request_animation_frame(tick.as_ref().unchecked_ref()) {
                self.request.set(Some(id));
            }
        }
    }

    fn cancel(&self) {
        if let Some(id) = self.request.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
    }
}

/// A `requestAnimationFrame` loop that can be paused and is cancelled on drop.
///
/// The frame closure only holds a weak reference back to the loop, so
/// dropping the `FrameLoop` is enough to end it.
pub struct FrameLoop {
    shared: Rc<LoopShared>,
}

impl FrameLoop {
    pub fn new(mut on_frame: impl FnMut() + 'static) -> Self {
        let shared = Rc::new(LoopShared {
            tick: RefCell::new(None),
            request: Cell::new(None),
            running: Cell::new(false),
        });
        let weak: Weak<LoopShared> = Rc::downgrade(&shared);
        *shared.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let Some(s) = weak.upgrade() else { return };
            s.request.set(None);
            if !s.running.get() {
                return;
            }
            on_frame();
            if s.running.get() {
                s.schedule();
            }
        }) as Box<dyn FnMut()>));
        Self { shared }
    }

    pub fn start(&self) {
        self.shared.running.set(true);
        self.shared.schedule();
    }

    pub fn stop(&self) {
        self.shared.running.set(false);
        self.shared.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.get()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
        self.shared.tick.borrow_mut().take();
    }
}
