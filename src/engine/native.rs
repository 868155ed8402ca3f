//! Built-in canvas-2D engine drawing a [`Flock`].

use crate::constants::*;
use crate::dom;
use crate::frame::FrameLoop;
use crate::listener::EventListener;
use crate::style;
use backdrop_core::{
    css_hex, BackdropError, EffectVariant, FeatureToggles, Flock, FrameRateCap, Palette,
    PerformanceTier, RenderParameters,
};
use glam::Vec2;
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub struct NativeEngine {
    layer: web::HtmlElement,
    variant: EffectVariant,
    palette: Palette,
    name: String,
}

impl NativeEngine {
    pub fn new(layer: web::HtmlElement, variant: EffectVariant, palette: Palette) -> Self {
        Self {
            layer,
            variant,
            palette,
            name: engine_name(variant),
        }
    }

    pub fn configure(&mut self, variant: EffectVariant, palette: Palette) {
        self.variant = variant;
        self.palette = palette;
        self.name = engine_name(variant);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create(
        &mut self,
        tier: PerformanceTier,
        params: &RenderParameters,
    ) -> Result<NativeHandle, BackdropError> {
        let fail = |reason: String| BackdropError::EngineConstruction {
            effect: self.name.clone(),
            tier,
            reason,
        };
        let document = self
            .layer
            .owner_document()
            .ok_or(BackdropError::MountDetached)?;
        if !self.layer.is_connected() {
            return Err(BackdropError::MountDetached);
        }
        let canvas = document
            .create_element("canvas")
            .map_err(|e| fail(format!("{:?}", e)))?
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|e| fail(format!("{:?}", e)))?;
        dom::set_style(&canvas, style::canvas_style());
        self.layer
            .append_child(&canvas)
            .map_err(|e| fail(format!("{:?}", e)))?;

        let ctx = match canvas.get_context("2d") {
            Ok(Some(ctx)) => ctx.dyn_into::<web::CanvasRenderingContext2d>().ok(),
            _ => None,
        };
        let ctx = match ctx {
            Some(ctx) => ctx,
            None => {
                canvas.remove();
                return Err(fail("2d context unavailable".into()));
            }
        };

        let (w, h, ratio) = dom::sync_canvas_backing_size(&canvas, params.pixel_ratio);
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        let flock = Flock::new(params, Vec2::new(w as f32, h as f32), seed);

        let state = Rc::new(RefCell::new(NativeState {
            ctx,
            flock,
            palette: self.palette,
            variant: self.variant,
            features: params.features,
            max_ratio: params.pixel_ratio,
            ratio,
            cap: FrameRateCap::PAUSED,
            last_draw: None,
            failed: false,
        }));
        let failure: Rc<RefCell<Option<BackdropError>>> = Rc::new(RefCell::new(None));
        let pointer: Rc<Cell<Option<Vec2>>> = Rc::new(Cell::new(None));

        let pointer_listener = if params.features.mouse_follow {
            let pointer = pointer.clone();
            let canvas_for_pointer = canvas.clone();
            let window = web::window().ok_or_else(|| fail("no window".into()))?;
            EventListener::new(&window, "pointermove", move |ev| {
                if let Some(m) = ev.dyn_ref::<web::MouseEvent>() {
                    let rect = canvas_for_pointer.get_bounding_client_rect();
                    let x = m.client_x() as f64 - rect.left();
                    let y = m.client_y() as f64 - rect.top();
                    let inside = x >= 0.0 && y >= 0.0 && x <= rect.width() && y <= rect.height();
                    pointer.set(inside.then(|| Vec2::new(x as f32, y as f32)));
                }
            })
            .map_err(|e| {
                log::warn!("[engine] pointer tracking unavailable: {:?}", e);
            })
            .ok()
        } else {
            None
        };

        let name = self.name.clone();
        let state_tick = state.clone();
        let failure_tick = failure.clone();
        let frame_loop = FrameLoop::new(move || {
            let mut st = state_tick.borrow_mut();
            if st.failed {
                return;
            }
            if let Err(e) = st.frame(pointer.get()) {
                st.failed = true;
                *failure_tick.borrow_mut() = Some(BackdropError::EngineRuntime {
                    effect: name.clone(),
                    reason: format!("{:?}", e),
                });
            }
        });

        let mut handle = NativeHandle {
            canvas,
            state,
            failure,
            frame_loop: Some(frame_loop),
            pointer_listener,
            destroyed: false,
        };
        handle.set_frame_rate(params.frame_rate_cap);
        Ok(handle)
    }
}

fn engine_name(variant: EffectVariant) -> String {
    format!("native-{}", variant.engine_name().to_ascii_lowercase())
}

struct NativeState {
    ctx: web::CanvasRenderingContext2d,
    flock: Flock,
    palette: Palette,
    variant: EffectVariant,
    features: FeatureToggles,
    max_ratio: f32,
    ratio: f64,
    cap: FrameRateCap,
    last_draw: Option<Instant>,
    failed: bool,
}

impl NativeState {
    fn frame(&mut self, pointer: Option<Vec2>) -> Result<(), JsValue> {
        let Some(interval_ms) = self.cap.frame_interval_ms() else {
            return Ok(());
        };
        let now = Instant::now();
        let dt = match self.last_draw {
            Some(last) => {
                let dt = now - last;
                // 1ms slack for rAF jitter
                if dt.as_secs_f64() * 1000.0 < interval_ms - 1.0 {
                    return Ok(());
                }
                dt
            }
            None => Duration::from_secs_f64(interval_ms / 1000.0),
        };
        self.last_draw = Some(now);
        let pointer = pointer.filter(|_| self.features.mouse_follow);
        self.flock.step(dt, pointer);
        self.draw()
    }

    fn draw(&self) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let bounds = self.flock.bounds();
        ctx.set_transform(self.ratio, 0.0, 0.0, self.ratio, 0.0, 0.0)?;
        ctx.set_global_alpha(1.0);
        ctx.set_shadow_blur(0.0);
        ctx.set_fill_style_str(&css_hex(self.palette.background));
        ctx.fill_rect(0.0, 0.0, bounds.x as f64, bounds.y as f64);

        let particles = self.flock.particles();
        if self.features.connect_lines {
            ctx.set_stroke_style_str(&css_hex(self.palette.secondary));
            ctx.set_line_width(LINK_WIDTH_PX);
            for link in self.flock.links() {
                let a = particles[link.a as usize].pos;
                let b = particles[link.b as usize].pos;
                ctx.set_global_alpha(LINK_MAX_ALPHA * link.alpha as f64);
                ctx.begin_path();
                ctx.move_to(a.x as f64, a.y as f64);
                ctx.line_to(b.x as f64, b.y as f64);
                ctx.stroke();
            }
            ctx.set_global_alpha(1.0);
        }

        if self.features.glow {
            ctx.set_shadow_blur(GLOW_BLUR_PX);
            ctx.set_shadow_color(&css_hex(self.palette.primary));
        }
        let size = self.flock.particle_size() as f64;
        ctx.begin_path();
        match self.variant {
            EffectVariant::Birds => {
                ctx.set_fill_style_str(&css_hex(self.palette.primary));
                let len = (size * BIRD_LENGTH_FACTOR) as f32;
                for p in particles {
                    let heading = p.vel.normalize_or_zero();
                    let side = heading.perp() * size as f32;
                    let tip = p.pos + heading * len;
                    let tail = p.pos - heading * len * 0.5;
                    ctx.move_to(tip.x as f64, tip.y as f64);
                    ctx.line_to((tail + side).x as f64, (tail + side).y as f64);
                    ctx.line_to((tail - side).x as f64, (tail - side).y as f64);
                    ctx.close_path();
                }
                ctx.fill();
            }
            EffectVariant::Waves => {
                ctx.set_stroke_style_str(&style::rgba(self.palette.primary, 0.8));
                ctx.set_line_width(size);
                for p in particles {
                    let trail = p.pos - p.vel.normalize_or_zero() * (size as f32 * 4.0);
                    ctx.move_to(trail.x as f64, trail.y as f64);
                    ctx.line_to(p.pos.x as f64, p.pos.y as f64);
                }
                ctx.stroke();
            }
            EffectVariant::Dots | EffectVariant::Net => {
                ctx.set_fill_style_str(&css_hex(self.palette.primary));
                for p in particles {
                    let (x, y) = (p.pos.x as f64, p.pos.y as f64);
                    ctx.move_to(x + size, y);
                    ctx.arc(x, y, size, 0.0, std::f64::consts::TAU)?;
                }
                ctx.fill();
            }
        }
        Ok(())
    }
}

pub struct NativeHandle {
    canvas: web::HtmlCanvasElement,
    state: Rc<RefCell<NativeState>>,
    failure: Rc<RefCell<Option<BackdropError>>>,
    frame_loop: Option<FrameLoop>,
    pointer_listener: Option<EventListener>,
    destroyed: bool,
}

impl NativeHandle {
    pub fn take_failure(&mut self) -> Option<BackdropError> {
        self.failure.borrow_mut().take()
    }

    pub fn set_frame_rate(&mut self, cap: FrameRateCap) {
        if self.destroyed {
            return;
        }
        {
            let mut st = self.state.borrow_mut();
            st.cap = cap;
            if cap.is_paused() {
                st.last_draw = None;
            }
        }
        if let Some(l) = &self.frame_loop {
            if cap.is_paused() {
                l.stop();
            } else if !l.is_running() {
                l.start();
            }
        }
    }

    pub fn resize(&mut self) {
        if self.destroyed {
            return;
        }
        let mut st = self.state.borrow_mut();
        let (w, h, ratio) = dom::sync_canvas_backing_size(&self.canvas, st.max_ratio);
        st.ratio = ratio;
        st.flock.resize(Vec2::new(w as f32, h as f32));
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.frame_loop.take();
        self.pointer_listener.take();
        self.canvas.remove();
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}
