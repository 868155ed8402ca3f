//! The mounted backdrop: owns the DOM it generates, the effect lifecycle and
//! every browser registration made on its behalf.
//!
//! All callbacks hold a `Weak` to the shared state and go through
//! [`with_inner`], so a callback that fires after unmount finds nothing to do.

use crate::capabilities::{self, BatteryStatus};
use crate::constants::*;
use crate::dom::{self, js_err};
use crate::engine::WebEngine;
use crate::frame::FrameLoop;
use crate::listener::{EventListener, IdleCallback, Timeout};
use crate::style;
use crate::visibility::VisibilityObservers;
use backdrop_core::{
    animation_enabled, compute_parameters, probe_report, BackgroundOptions, DeviceCapabilities,
    EffectLifecycle, FpsMonitor, LifecycleState, LoadStep, PerformanceTier, RenderMode,
    RenderParameters, Theme, ThemePreference,
};
use instant::Instant;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

type Shared = Rc<RefCell<Inner>>;
type WeakShared = Weak<RefCell<Inner>>;

fn with_inner(weak: &WeakShared, f: impl FnOnce(&mut Inner)) {
    let Some(rc) = weak.upgrade() else { return };
    let Ok(mut inner) = rc.try_borrow_mut() else {
        log::warn!("[lifecycle] callback re-entered while busy; skipped");
        return;
    };
    if inner.torn_down {
        return;
    }
    f(&mut inner);
}

/// DOM state captured at mount and put back on unmount.
struct Restore {
    style: Option<String>,
    class_name: String,
}

struct Inner {
    me: WeakShared,
    window: web::Window,
    document: web::Document,
    container: web::HtmlElement,
    layer: web::HtmlElement,
    slot: web::HtmlElement,
    restore: Restore,
    options: BackgroundOptions,
    theme: Theme,
    caps: DeviceCapabilities,
    /// Lowest tier reached through the FPS ratchet; cleared by a resize.
    degraded: Option<PerformanceTier>,
    lifecycle: EffectLifecycle<WebEngine>,
    fps: FpsMonitor,
    last_frame: Option<Instant>,
    fps_loop: Option<FrameLoop>,
    poll_timer: Option<Timeout>,
    idle: Option<IdleCallback>,
    resize_timer: Option<Timeout>,
    observers: Option<VisibilityObservers>,
    listeners: Vec<EventListener>,
    torn_down: bool,
}

impl Inner {
    fn palette(&self) -> backdrop_core::Palette {
        self.options.palette_for(self.theme)
    }

    fn is_mobile(&self) -> bool {
        self.caps.is_mobile()
    }

    /// Tier from the current capabilities, never above the ratchet floor.
    fn probe_tier(&self) -> PerformanceTier {
        let report = probe_report(&self.caps, self.options.force_mobile_high_performance);
        log::info!(
            "[probe] tier {} (mobile: {}, forced: {}, strong signals: {})",
            report.tier,
            report.is_mobile,
            report.forced,
            report.signals.strong_count()
        );
        match self.degraded {
            Some(floor) => report.tier.min(floor),
            None => report.tier,
        }
    }

    /// Parameters for `tier`, or `None` when the static fallback applies.
    fn derive(&self, tier: PerformanceTier) -> Option<RenderParameters> {
        if !animation_enabled(
            self.caps.prefers_reduced_motion(),
            self.options.respect_reduced_motion,
        ) {
            return None;
        }
        let params = compute_parameters(
            tier,
            &self.options.base_config(),
            self.options.force_mobile_high_performance,
            self.is_mobile(),
        );
        Some(params.with_mouse_controls(self.options.mouse_controls))
    }

    /// Fresh lifecycle for the current engine kind, carrying visibility over.
    fn start(&mut self) {
        let previous = self.lifecycle.visibility();
        self.cancel_pending();
        self.lifecycle.destroy();
        let engine = WebEngine::new(
            self.options.engine,
            self.layer.clone(),
            self.options.effect,
            self.palette(),
        );
        self.lifecycle = EffectLifecycle::new(engine);
        self.lifecycle.set_in_viewport(previous.in_viewport);
        self.lifecycle.set_tab_active(previous.tab_active);
        self.lifecycle.begin_probing();

        let tier = self.probe_tier();
        let params = self.derive(tier);
        self.lifecycle.resolve_tier(tier, params);
        self.sync_presentation();
        self.poll();
    }

    fn poll(&mut self) {
        if self.lifecycle.state() != LifecycleState::Probing {
            return;
        }
        match self.lifecycle.poll_engine() {
            LoadStep::Retry { after_ms } => {
                self.poll_timer = self.timeout(after_ms as i32, |inner| inner.poll());
            }
            LoadStep::InjectScriptAndProceed => {
                self.lifecycle.engine().inject_scripts(&self.document);
                self.poll_timer = self.timeout(SCRIPT_GRACE_MS, |inner| inner.schedule_init());
            }
            LoadStep::Ready | LoadStep::Proceed => self.schedule_init(),
        }
    }

    fn schedule_init(&mut self) {
        self.poll_timer = None;
        if self.lifecycle.state() != LifecycleState::Initializing {
            return;
        }
        let weak = self.me.clone();
        match IdleCallback::new(IDLE_FALLBACK_DELAY_MS, move || {
            with_inner(&weak, |inner| inner.initialize())
        }) {
            Ok(idle) => self.idle = Some(idle),
            Err(e) => {
                log::warn!("[lifecycle] idle scheduling failed ({e}); initializing now");
                self.initialize();
            }
        }
    }

    fn initialize(&mut self) {
        self.idle = None;
        self.lifecycle.initialize();
        self.sync_presentation();
    }

    /// Re-read capabilities and rebuild when the tier or parameters moved.
    /// Returns whether the engine was rebuilt.
    fn reevaluate(&mut self, clear_ratchet: bool) -> bool {
        capabilities::refresh(&self.window, &mut self.caps);
        if clear_ratchet && self.degraded.take().is_some() {
            log::info!("[fps] resize re-probe clears degraded tier");
        }
        let tier = self.probe_tier();
        let params = self.derive(tier);
        let changed =
            self.lifecycle.tier() != Some(tier) || self.lifecycle.params() != params.as_ref();
        if changed {
            self.rebuild(tier, params);
        }
        changed
    }

    fn rebuild(&mut self, tier: PerformanceTier, params: Option<RenderParameters>) {
        self.idle = None;
        // While the engine script is still pending this only swaps the
        // parameters; the poll chain picks them up.
        self.lifecycle.reconfigure(tier, params);
        self.sync_presentation();
        if self.lifecycle.state() == LifecycleState::Probing && self.poll_timer.is_none() {
            self.poll();
        }
    }

    fn on_resize(&mut self) {
        self.resize_timer = None;
        if !self.reevaluate(true) {
            self.lifecycle.resize();
        }
    }

    fn schedule_resize(&mut self) {
        self.resize_timer = self.timeout(RESIZE_DEBOUNCE_MS, |inner| inner.on_resize());
    }

    fn apply_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        log::info!("[lifecycle] theme -> {:?}", theme);
        self.theme = theme;
        let palette = self.palette();
        self.lifecycle
            .engine_mut()
            .configure(self.options.effect, palette);
        if let Some(tier) = self.lifecycle.tier() {
            let params = self.derive(tier);
            self.rebuild(tier, params);
        } else {
            self.sync_presentation();
        }
    }

    fn set_options(&mut self, options: BackgroundOptions) {
        if !self.options.requires_recreate(&options) {
            self.options = options;
            self.apply_container_class();
            return;
        }
        let kind_changed = self.options.engine != options.engine;
        self.options = options;
        self.apply_container_class();
        self.theme = self
            .options
            .theme
            .resolve(capabilities::prefers_dark(&self.window));
        if kind_changed || self.lifecycle.tier().is_none() {
            self.start();
            return;
        }
        let palette = self.palette();
        self.lifecycle
            .engine_mut()
            .configure(self.options.effect, palette);
        let tier = self.probe_tier();
        let params = self.derive(tier);
        self.rebuild(tier, params);
    }

    fn on_frame(&mut self) {
        if let Some(err) = self.lifecycle.handle_mut().and_then(|h| h.take_failure()) {
            self.lifecycle.report_failure(err);
            self.sync_presentation();
            return;
        }
        let now = Instant::now();
        let Some(prev) = self.last_frame.replace(now) else { return };
        let Some(tier) = self.lifecycle.tier() else { return };
        let Some(next) = self.fps.tick(now - prev, tier) else { return };
        let Some(params) = self.derive(next) else { return };
        self.degraded = Some(next);
        if self.lifecycle.degrade_tier(next, params) {
            self.sync_presentation();
        }
    }

    /// Layer styling for the current render mode, plus the FPS loop gate.
    fn sync_presentation(&mut self) {
        let palette = self.palette();
        let mode = self.lifecycle.render_mode();
        let (background, interactive) = match mode {
            RenderMode::Static => (style::static_backdrop(&palette), false),
            RenderMode::Animated => (
                style::animated_backdrop(&palette),
                self.lifecycle
                    .params()
                    .map(|p| self.lifecycle.engine().needs_pointer_events(p))
                    .unwrap_or(false),
            ),
        };
        dom::set_style(&self.layer, &style::layer_style(interactive, &background));
        _ = self
            .layer
            .class_list()
            .toggle_with_force(STATIC_CLASS, mode == RenderMode::Static);
        self.update_fps_loop();
    }

    /// The FPS loop only runs while the effect is animating on screen.
    fn update_fps_loop(&mut self) {
        let Some(fps_loop) = self.fps_loop.as_ref() else { return };
        let running = self.lifecycle.state() == LifecycleState::Running;
        if running && !fps_loop.is_running() {
            self.fps.reset();
            self.last_frame = None;
            fps_loop.start();
        } else if !running && fps_loop.is_running() {
            fps_loop.stop();
        }
    }

    fn apply_container_class(&self) {
        let mut class = self.restore.class_name.clone();
        for extra in [Some(CONTAINER_CLASS), self.options.class_name.as_deref()]
            .into_iter()
            .flatten()
        {
            if !class.split_whitespace().any(|c| c == extra) {
                if !class.is_empty() {
                    class.push(' ');
                }
                class.push_str(extra);
            }
        }
        self.container.set_class_name(&class);
    }

    fn timeout(&self, delay_ms: i32, f: impl FnOnce(&mut Inner) + 'static) -> Option<Timeout> {
        let weak = self.me.clone();
        let mut f = Some(f);
        match Timeout::new(delay_ms, move || {
            if let Some(f) = f.take() {
                with_inner(&weak, f);
            }
        }) {
            Ok(t) => Some(t),
            Err(e) => {
                log::warn!("[lifecycle] could not schedule timer: {e}");
                None
            }
        }
    }

    fn cancel_pending(&mut self) {
        self.poll_timer = None;
        self.idle = None;
        self.resize_timer = None;
    }

    /// Cancel everything, destroy the engine and put the page back as found.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.cancel_pending();
        self.fps_loop = None;
        self.observers = None;
        self.listeners.clear();
        self.lifecycle.destroy();

        dom::move_children(&self.slot, &self.container);
        self.layer.remove();
        self.slot.remove();
        match self.restore.style.as_deref() {
            Some(s) => {
                _ = self.container.set_attribute("style", s);
            }
            None => {
                _ = self.container.remove_attribute("style");
            }
        }
        self.container.set_class_name(&self.restore.class_name);
        log::info!("[lifecycle] unmounted");
    }
}

/// A mounted animated backdrop. Dropping it unmounts.
pub struct Background {
    inner: Shared,
}

impl Background {
    pub fn mount(container: web::HtmlElement, options: BackgroundOptions) -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow::anyhow!("no document"))?;
        if !container.is_connected() {
            return Err(backdrop_core::BackdropError::MountDetached.into());
        }

        let restore = Restore {
            style: container.get_attribute("style"),
            class_name: container.class_name(),
        };
        let layer = dom::create_div(&document, LAYER_CLASS)?;
        let slot = dom::create_div(&document, SLOT_CLASS)?;
        dom::set_style(&slot, &style::slot_style());
        dom::move_children(&container, &slot);
        container.append_child(&layer).map_err(js_err)?;
        container.append_child(&slot).map_err(js_err)?;
        dom::set_style(
            &container,
            &style::container_style(restore.style.as_deref()),
        );

        let theme = options.theme.resolve(capabilities::prefers_dark(&window));
        let caps = capabilities::detect(&window);
        let engine = WebEngine::new(
            options.engine,
            layer.clone(),
            options.effect,
            options.palette_for(theme),
        );
        let tab_active = !document.hidden();

        let inner = Rc::new_cyclic(|me: &WeakShared| {
            RefCell::new(Inner {
                me: me.clone(),
                window: window.clone(),
                document: document.clone(),
                container: container.clone(),
                layer: layer.clone(),
                slot: slot.clone(),
                restore,
                options,
                theme,
                caps,
                degraded: None,
                lifecycle: EffectLifecycle::new(engine),
                fps: FpsMonitor::new(),
                last_frame: None,
                fps_loop: None,
                poll_timer: None,
                idle: None,
                resize_timer: None,
                observers: None,
                listeners: Vec::new(),
                torn_down: false,
            })
        });
        let weak = Rc::downgrade(&inner);
        let this = Self { inner };

        {
            let mut st = this.inner.borrow_mut();
            st.apply_container_class();
            st.lifecycle.set_tab_active(tab_active);
            let w = weak.clone();
            st.fps_loop = Some(FrameLoop::new(move || with_inner(&w, |i| i.on_frame())));
            st.listeners = register_listeners(&window, &weak);
            let (wv, wt) = (weak.clone(), weak.clone());
            match VisibilityObservers::observe(
                &container,
                &document,
                move |visible| {
                    with_inner(&wv, |i| {
                        i.lifecycle.set_in_viewport(visible);
                        i.update_fps_loop();
                    })
                },
                move |active| {
                    with_inner(&wt, |i| {
                        i.lifecycle.set_tab_active(active);
                        i.update_fps_loop();
                    })
                },
            ) {
                Ok(obs) => st.observers = Some(obs),
                Err(e) => log::warn!("[visibility] observers unavailable: {e}"),
            }
            log::info!(
                "[lifecycle] mounting {:?} via {:?} engine",
                st.options.effect,
                st.options.engine
            );
            st.lifecycle.begin_probing();
            let tier = st.probe_tier();
            let params = st.derive(tier);
            st.lifecycle.resolve_tier(tier, params);
            st.sync_presentation();
            st.poll();
        }

        subscribe_battery(window, weak);
        Ok(this)
    }

    pub fn set_options(&self, options: BackgroundOptions) {
        with_inner(&Rc::downgrade(&self.inner), |i| i.set_options(options));
    }

    /// `"light"`, `"dark"` or `"auto"`.
    pub fn set_theme(&self, name: &str) -> anyhow::Result<()> {
        let pref = match name.trim().to_ascii_lowercase().as_str() {
            "auto" => ThemePreference::Auto,
            other => match Theme::parse(other) {
                Some(Theme::Light) => ThemePreference::Light,
                Some(Theme::Dark) => ThemePreference::Dark,
                None => {
                    return Err(backdrop_core::BackdropError::InvalidOptions(format!(
                        "unknown theme `{name}`"
                    ))
                    .into())
                }
            },
        };
        with_inner(&Rc::downgrade(&self.inner), |i| {
            i.options.theme = pref;
            let theme = pref.resolve(capabilities::prefers_dark(&i.window));
            i.apply_theme(theme);
        });
        Ok(())
    }

    pub fn unmount(&self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.teardown();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner
            .try_borrow()
            .map(|i| !i.torn_down)
            .unwrap_or(true)
    }
}

impl Drop for Background {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn register_listeners(window: &web::Window, weak: &WeakShared) -> Vec<EventListener> {
    let mut out = Vec::new();
    let mut add = |target: &web::EventTarget, event: &'static str, f: fn(&mut Inner)| {
        let w = weak.clone();
        match EventListener::new(target, event, move |_| with_inner(&w, f)) {
            Ok(l) => out.push(l),
            Err(e) => log::warn!("[lifecycle] could not listen for {event}: {e}"),
        }
    };

    add(window, "resize", Inner::schedule_resize);
    add(window, "orientationchange", Inner::schedule_resize);
    if let Some(mq) = capabilities::media_query(window, REDUCED_MOTION_QUERY) {
        add(&mq, "change", |i| {
            i.reevaluate(false);
        });
    }
    if let Some(mq) = capabilities::media_query(window, DARK_SCHEME_QUERY) {
        add(&mq, "change", |i| {
            if i.options.theme == ThemePreference::Auto {
                let theme = ThemePreference::Auto.resolve(capabilities::prefers_dark(&i.window));
                i.apply_theme(theme);
            }
        });
    }
    if let Some(conn) = capabilities::connection(window) {
        add(&conn, "change", |i| {
            i.reevaluate(false);
        });
    }
    out
}

fn apply_battery(inner: &mut Inner, status: &BatteryStatus) {
    inner.caps.battery_level = status.level;
    inner.caps.battery_charging = status.charging;
}

/// Battery state arrives asynchronously; later changes re-run the probe.
fn subscribe_battery(window: web::Window, weak: WeakShared) {
    spawn_local(async move {
        let Some(status) = capabilities::battery(&window).await else {
            return;
        };
        with_inner(&weak, |inner| {
            apply_battery(inner, &status);
            for event in ["levelchange", "chargingchange"] {
                let w = weak.clone();
                let manager = status.manager.clone();
                match EventListener::new(&status.manager, event, move |_| {
                    let status = BatteryStatus::read(manager.clone());
                    with_inner(&w, |i| {
                        apply_battery(i, &status);
                        i.reevaluate(false);
                    });
                }) {
                    Ok(l) => inner.listeners.push(l),
                    Err(e) => log::warn!("[probe] battery listener failed: {e}"),
                }
            }
            inner.reevaluate(false);
        });
    });
}
