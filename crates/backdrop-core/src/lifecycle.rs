//! Effect lifecycle: owns the single live engine handle for one mount point.
//!
//! ```text
//! Uninitialized -> Probing -> Initializing -> Running <-> Paused
//!                                   |            |          |
//!                                   +------> Destroyed <----+
//! ```
//!
//! A new handle is only ever created after the previous one was destroyed,
//! and once [`EffectLifecycle::destroy`] has been called every later call is
//! a no-op, so late timers or idle callbacks cannot resurrect the effect.

use crate::error::BackdropError;
use crate::loader::{LoadGate, LoadStep};
use crate::policy::{FrameRateCap, RenderParameters};
use crate::tier::PerformanceTier;
use crate::visibility::{VisibilityChange, VisibilityState, VisibilityTracker};

/// A live engine instance bound to one mount point.
///
/// `destroy` must tolerate being called more than once.
pub trait EffectHandle {
    fn set_frame_rate(&mut self, cap: FrameRateCap);
    fn resize(&mut self);
    fn destroy(&mut self);
}

/// Adapter over a concrete animation engine.
pub trait EffectEngine {
    type Handle: EffectHandle;

    fn name(&self) -> &str;
    /// Whether the engine's code is available to construct instances.
    fn is_loaded(&self) -> bool;
    fn create(
        &mut self,
        tier: PerformanceTier,
        params: &RenderParameters,
    ) -> Result<Self::Handle, BackdropError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Probing,
    Initializing,
    Running,
    Paused,
    Destroyed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Animated,
    Static,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// The user asked the OS for reduced motion.
    ReducedMotion,
    EngineUnavailable,
    ConstructionFailed,
    /// The engine broke while drawing.
    RuntimeFailure,
}

pub struct EffectLifecycle<E: EffectEngine> {
    engine: E,
    state: LifecycleState,
    handle: Option<E::Handle>,
    tier: Option<PerformanceTier>,
    params: Option<RenderParameters>,
    visibility: VisibilityTracker,
    loader: LoadGate,
    fallback: Option<FallbackReason>,
    last_error: Option<BackdropError>,
    unmounted: bool,
}

impl<E: EffectEngine> EffectLifecycle<E> {
    pub fn new(engine: E) -> Self {
        Self::with_loader(engine, LoadGate::default())
    }

    pub fn with_loader(engine: E, loader: LoadGate) -> Self {
        Self {
            engine,
            state: LifecycleState::Uninitialized,
            handle: None,
            tier: None,
            params: None,
            visibility: VisibilityTracker::default(),
            loader,
            fallback: None,
            last_error: None,
            unmounted: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn tier(&self) -> Option<PerformanceTier> {
        self.tier
    }

    pub fn params(&self) -> Option<&RenderParameters> {
        self.params.as_ref()
    }

    pub fn visibility(&self) -> VisibilityState {
        self.visibility.state()
    }

    pub fn fallback(&self) -> Option<FallbackReason> {
        self.fallback
    }

    pub fn last_error(&self) -> Option<&BackdropError> {
        self.last_error.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn handle_mut(&mut self) -> Option<&mut E::Handle> {
        self.handle.as_mut()
    }

    pub fn has_live_handle(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    pub fn render_mode(&self) -> RenderMode {
        match self.state {
            LifecycleState::Running | LifecycleState::Paused => RenderMode::Animated,
            _ => RenderMode::Static,
        }
    }

    /// Frame rate the live handle is currently told to draw at.
    pub fn effective_frame_rate(&self) -> FrameRateCap {
        match (self.state, &self.params) {
            (LifecycleState::Running, Some(p)) => p.frame_rate_cap,
            _ => FrameRateCap::PAUSED,
        }
    }

    /// Mount node attached; start probing.
    pub fn begin_probing(&mut self) -> bool {
        if self.unmounted || self.state != LifecycleState::Uninitialized {
            return false;
        }
        self.state = LifecycleState::Probing;
        true
    }

    /// Record the probed tier. `params` is `None` when animation is disabled,
    /// which settles on the static fallback without touching the engine.
    pub fn resolve_tier(&mut self, tier: PerformanceTier, params: Option<RenderParameters>) {
        if self.unmounted {
            return;
        }
        self.tier = Some(tier);
        match params {
            Some(p) => self.params = Some(p),
            None => {
                self.params = None;
                self.settle_static(FallbackReason::ReducedMotion);
            }
        }
    }

    /// Check whether the engine is loaded. Moves to `Initializing` once it is,
    /// or once the retry budget is spent.
    pub fn poll_engine(&mut self) -> LoadStep {
        if self.unmounted || self.state != LifecycleState::Probing {
            return LoadStep::Proceed;
        }
        let step = self.loader.poll(self.engine.is_loaded());
        match step {
            LoadStep::Ready | LoadStep::InjectScriptAndProceed | LoadStep::Proceed => {
                if self.params.is_some() {
                    self.state = LifecycleState::Initializing;
                }
            }
            LoadStep::Retry { after_ms } => {
                log::debug!(
                    "[lifecycle] {} not loaded yet (attempt {}), retrying in {}ms",
                    self.engine.name(),
                    self.loader.failures(),
                    after_ms
                );
            }
        }
        step
    }

    /// Construct the engine instance. Failures are absorbed: the error is
    /// logged and kept in [`Self::last_error`], and the static fallback is
    /// selected.
    pub fn initialize(&mut self) -> RenderMode {
        if self.unmounted || self.state != LifecycleState::Initializing {
            return self.render_mode();
        }
        self.teardown_handle();
        let (tier, params) = match (self.tier, self.params) {
            (Some(t), Some(p)) => (t, p),
            _ => {
                self.settle_static(FallbackReason::ConstructionFailed);
                return RenderMode::Static;
            }
        };
        if !self.engine.is_loaded() {
            let err = BackdropError::EngineUnavailable {
                effect: self.engine.name().to_string(),
            };
            log::warn!("[lifecycle] {}; using static backdrop", err);
            self.last_error = Some(err);
            self.settle_static(FallbackReason::EngineUnavailable);
            return RenderMode::Static;
        }
        match self.engine.create(tier, &params) {
            Ok(mut handle) => {
                if self.visibility.state().is_visible() {
                    self.state = LifecycleState::Running;
                } else {
                    handle.set_frame_rate(FrameRateCap::PAUSED);
                    self.state = LifecycleState::Paused;
                }
                self.handle = Some(handle);
                self.fallback = None;
                self.last_error = None;
                log::info!(
                    "[lifecycle] {} running at tier {} ({} particles, cap {}fps)",
                    self.engine.name(),
                    tier,
                    params.particle_count,
                    params.frame_rate_cap.get()
                );
                RenderMode::Animated
            }
            Err(err) => {
                log::error!(
                    "[lifecycle] {} failed at tier {} with {:?}: {}",
                    self.engine.name(),
                    tier,
                    params,
                    err
                );
                self.last_error = Some(err);
                self.settle_static(FallbackReason::ConstructionFailed);
                RenderMode::Static
            }
        }
    }

    pub fn set_in_viewport(&mut self, in_viewport: bool) {
        let change = self.visibility.set_in_viewport(in_viewport);
        self.apply_visibility(change);
    }

    pub fn set_tab_active(&mut self, tab_active: bool) {
        let change = self.visibility.set_tab_active(tab_active);
        self.apply_visibility(change);
    }

    fn apply_visibility(&mut self, change: VisibilityChange) {
        if self.unmounted {
            return;
        }
        match (change, self.state) {
            (VisibilityChange::Pause, LifecycleState::Running) => {
                if let Some(h) = self.handle.as_mut() {
                    h.set_frame_rate(FrameRateCap::PAUSED);
                }
                self.state = LifecycleState::Paused;
                log::debug!("[lifecycle] paused");
            }
            (VisibilityChange::Resume, LifecycleState::Paused) => {
                let cap = self
                    .params
                    .map(|p| p.frame_rate_cap)
                    .unwrap_or(FrameRateCap::PAUSED);
                if let Some(h) = self.handle.as_mut() {
                    h.set_frame_rate(cap);
                }
                self.state = LifecycleState::Running;
                log::debug!("[lifecycle] resumed at {}fps", cap.get());
            }
            _ => {}
        }
    }

    pub fn resize(&mut self) {
        if let Some(h) = self.handle.as_mut() {
            h.resize();
        }
    }

    /// Tear down and rebuild with new parameters (tier, theme or options
    /// changed). Returns the resulting render mode.
    pub fn reconfigure(
        &mut self,
        tier: PerformanceTier,
        params: Option<RenderParameters>,
    ) -> RenderMode {
        if self.unmounted || self.state == LifecycleState::Uninitialized {
            return self.render_mode();
        }
        self.teardown_handle();
        self.tier = Some(tier);
        match params {
            Some(p) => {
                self.params = Some(p);
                if self.state == LifecycleState::Probing {
                    // Still waiting on the engine script; poll_engine will
                    // move on with the new parameters.
                    return RenderMode::Static;
                }
                if !self.engine.is_loaded() && !self.loader.attempted() {
                    // Never polled (static from the start): go through the
                    // load step before constructing.
                    self.loader.reset();
                    self.fallback = None;
                    self.state = LifecycleState::Probing;
                    log::debug!("[lifecycle] {} not loaded; polling", self.engine.name());
                    return RenderMode::Static;
                }
                self.state = LifecycleState::Initializing;
                self.initialize()
            }
            None => {
                self.params = None;
                self.settle_static(FallbackReason::ReducedMotion);
                RenderMode::Static
            }
        }
    }

    /// Ratchet down after sustained low frame rate. Ignored unless `tier` is
    /// strictly below the current tier.
    pub fn degrade_tier(&mut self, tier: PerformanceTier, params: RenderParameters) -> bool {
        match self.tier {
            Some(current) if tier < current => {
                if self.params == Some(params) {
                    // Same profile at the lower tier; keep the live instance.
                    log::info!("[lifecycle] tier {} -> {} keeps parameters", current, tier);
                    self.tier = Some(tier);
                    return true;
                }
                log::warn!("[lifecycle] degrading tier {} -> {}", current, tier);
                self.reconfigure(tier, Some(params));
                true
            }
            _ => false,
        }
    }

    /// The live engine failed inside its own frame callback. Tears the
    /// handle down and settles on the static fallback.
    pub fn report_failure(&mut self, err: BackdropError) {
        if self.unmounted || self.handle.is_none() {
            return;
        }
        log::error!(
            "[lifecycle] {} failed while running at tier {:?}: {}",
            self.engine.name(),
            self.tier,
            err
        );
        self.last_error = Some(err);
        self.settle_static(FallbackReason::RuntimeFailure);
    }

    /// Unmount. Idempotent.
    pub fn destroy(&mut self) {
        self.teardown_handle();
        self.state = LifecycleState::Destroyed;
        self.unmounted = true;
    }

    fn settle_static(&mut self, reason: FallbackReason) {
        self.teardown_handle();
        self.fallback = Some(reason);
        self.state = LifecycleState::Destroyed;
    }

    fn teardown_handle(&mut self) {
        if let Some(mut h) = self.handle.take() {
            h.destroy();
        }
    }
}

impl<E: EffectEngine> Drop for EffectLifecycle<E> {
    fn drop(&mut self) {
        self.teardown_handle();
    }
}
