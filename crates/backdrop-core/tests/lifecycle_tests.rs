// Effect lifecycle driven through a recording mock engine.

use backdrop_core::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Created(u32),
    FrameRate(u32, u32),
    Resized(u32),
    Destroyed(u32),
}

type Log = Rc<RefCell<Vec<Event>>>;

struct MockHandle {
    id: u32,
    log: Log,
    destroyed: bool,
}

impl EffectHandle for MockHandle {
    fn set_frame_rate(&mut self, cap: FrameRateCap) {
        self.log.borrow_mut().push(Event::FrameRate(self.id, cap.get()));
    }

    fn resize(&mut self) {
        self.log.borrow_mut().push(Event::Resized(self.id));
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.log.borrow_mut().push(Event::Destroyed(self.id));
    }
}

struct MockEngine {
    loaded: Rc<RefCell<bool>>,
    fail_create: bool,
    next_id: u32,
    log: Log,
}

impl EffectEngine for MockEngine {
    type Handle = MockHandle;

    fn name(&self) -> &str {
        "mock"
    }

    fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    fn create(
        &mut self,
        tier: PerformanceTier,
        _params: &RenderParameters,
    ) -> backdrop_core::Result<MockHandle> {
        if self.fail_create {
            return Err(BackdropError::EngineConstruction {
                effect: "mock".into(),
                tier,
                reason: "constructor threw".into(),
            });
        }
        self.next_id += 1;
        self.log.borrow_mut().push(Event::Created(self.next_id));
        Ok(MockHandle {
            id: self.next_id,
            log: self.log.clone(),
            destroyed: false,
        })
    }
}

fn make(loaded: bool, fail_create: bool) -> (EffectLifecycle<MockEngine>, Log, Rc<RefCell<bool>>) {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let loaded = Rc::new(RefCell::new(loaded));
    let engine = MockEngine {
        loaded: loaded.clone(),
        fail_create,
        next_id: 0,
        log: log.clone(),
    };
    (EffectLifecycle::new(engine), log, loaded)
}

fn params(tier: PerformanceTier, is_mobile: bool) -> RenderParameters {
    compute_parameters(tier, &BaseConfig::default(), false, is_mobile)
}

fn run_to_running(lc: &mut EffectLifecycle<MockEngine>, tier: PerformanceTier, is_mobile: bool) {
    assert!(lc.begin_probing());
    lc.resolve_tier(tier, Some(params(tier, is_mobile)));
    assert_eq!(lc.poll_engine(), LoadStep::Ready);
    assert_eq!(lc.state(), LifecycleState::Initializing);
    assert_eq!(lc.initialize(), RenderMode::Animated);
}

#[test]
fn happy_path_reaches_running() {
    let (mut lc, log, _) = make(true, false);
    assert_eq!(lc.state(), LifecycleState::Uninitialized);
    run_to_running(&mut lc, PerformanceTier::High, false);
    assert_eq!(lc.state(), LifecycleState::Running);
    assert_eq!(lc.effective_frame_rate(), FrameRateCap::FPS_60);
    assert_eq!(*log.borrow(), vec![Event::Created(1)]);
}

#[test]
fn viewport_exit_pauses_without_destroying() {
    let (mut lc, log, _) = make(true, false);
    run_to_running(&mut lc, PerformanceTier::Medium, false);
    lc.set_in_viewport(false);
    assert_eq!(lc.state(), LifecycleState::Paused);
    assert_eq!(lc.effective_frame_rate(), FrameRateCap::PAUSED);
    assert!(lc.has_live_handle());
    lc.set_in_viewport(true);
    assert_eq!(lc.state(), LifecycleState::Running);
    assert_eq!(lc.effective_frame_rate(), FrameRateCap::FPS_50);
    assert_eq!(
        *log.borrow(),
        vec![Event::Created(1), Event::FrameRate(1, 0), Event::FrameRate(1, 50)]
    );
}

#[test]
fn both_signals_must_be_true_to_resume() {
    let (mut lc, _, _) = make(true, false);
    run_to_running(&mut lc, PerformanceTier::High, false);
    lc.set_tab_active(false);
    lc.set_in_viewport(false);
    lc.set_tab_active(true);
    assert_eq!(lc.state(), LifecycleState::Paused);
    lc.set_in_viewport(true);
    assert_eq!(lc.state(), LifecycleState::Running);
}

#[test]
fn low_end_mobile_with_background_tab() {
    let caps = DeviceCapabilities {
        user_agent: Some("Mozilla/5.0 (Linux; Android 12; SM-A125F) Mobile Safari/537.36".into()),
        device_memory_gb: Some(1.0),
        hardware_concurrency: Some(2),
        ..Default::default()
    };
    let tier = probe(&caps, false);
    assert_eq!(tier, PerformanceTier::VeryLow);

    let (mut lc, _, _) = make(true, false);
    lc.set_tab_active(false);
    assert!(lc.begin_probing());
    lc.resolve_tier(tier, Some(params(tier, caps.is_mobile())));
    lc.poll_engine();
    lc.initialize();
    assert_eq!(lc.state(), LifecycleState::Paused);
    assert_eq!(lc.effective_frame_rate().get(), 0);

    lc.set_tab_active(true);
    let fps = lc.effective_frame_rate().get();
    assert!((20..=30).contains(&fps), "{fps}");
}

#[test]
fn engine_script_never_loads_falls_back_to_static() {
    let (mut lc, log, _) = make(false, false);
    assert!(lc.begin_probing());
    lc.resolve_tier(PerformanceTier::High, Some(params(PerformanceTier::High, false)));
    for _ in 0..3 {
        assert!(matches!(lc.poll_engine(), LoadStep::Retry { .. }));
    }
    assert_eq!(lc.poll_engine(), LoadStep::InjectScriptAndProceed);
    assert_eq!(lc.state(), LifecycleState::Initializing);
    assert_eq!(lc.initialize(), RenderMode::Static);
    assert_eq!(lc.state(), LifecycleState::Destroyed);
    assert_eq!(lc.fallback(), Some(FallbackReason::EngineUnavailable));
    assert!(matches!(
        lc.last_error(),
        Some(BackdropError::EngineUnavailable { .. })
    ));
    assert!(log.borrow().is_empty());
}

#[test]
fn injected_script_that_arrives_late_still_initialises() {
    let (mut lc, _, loaded) = make(false, false);
    lc.begin_probing();
    lc.resolve_tier(PerformanceTier::Medium, Some(params(PerformanceTier::Medium, false)));
    for _ in 0..4 {
        lc.poll_engine();
    }
    assert_eq!(lc.state(), LifecycleState::Initializing);
    *loaded.borrow_mut() = true;
    assert_eq!(lc.initialize(), RenderMode::Animated);
}

#[test]
fn constructor_failure_is_absorbed() {
    let (mut lc, _, _) = make(true, true);
    lc.begin_probing();
    lc.resolve_tier(PerformanceTier::Low, Some(params(PerformanceTier::Low, true)));
    lc.poll_engine();
    assert_eq!(lc.initialize(), RenderMode::Static);
    assert_eq!(lc.fallback(), Some(FallbackReason::ConstructionFailed));
    assert!(!lc.has_live_handle());
}

#[test]
fn unmount_during_initialisation_prevents_creation() {
    let (mut lc, log, _) = make(true, false);
    lc.begin_probing();
    lc.resolve_tier(PerformanceTier::High, Some(params(PerformanceTier::High, false)));
    lc.poll_engine();
    lc.destroy();
    // Idle callback fires late.
    assert_eq!(lc.initialize(), RenderMode::Static);
    lc.set_in_viewport(false);
    lc.set_in_viewport(true);
    assert!(log.borrow().is_empty());
    assert_eq!(lc.state(), LifecycleState::Destroyed);
}

#[test]
fn destroy_is_idempotent() {
    let (mut lc, log, _) = make(true, false);
    run_to_running(&mut lc, PerformanceTier::High, false);
    lc.destroy();
    lc.destroy();
    assert_eq!(*log.borrow(), vec![Event::Created(1), Event::Destroyed(1)]);
}

#[test]
fn handle_destroy_twice_is_a_no_op() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut handle = MockHandle {
        id: 7,
        log: log.clone(),
        destroyed: false,
    };
    handle.destroy();
    handle.destroy();
    assert_eq!(*log.borrow(), vec![Event::Destroyed(7)]);
}

#[test]
fn reconfigure_destroys_before_creating() {
    let (mut lc, log, _) = make(true, false);
    run_to_running(&mut lc, PerformanceTier::High, false);
    let mode = lc.reconfigure(PerformanceTier::Medium, Some(params(PerformanceTier::Medium, false)));
    assert_eq!(mode, RenderMode::Animated);
    assert_eq!(
        *log.borrow(),
        vec![Event::Created(1), Event::Destroyed(1), Event::Created(2)]
    );
    assert_eq!(lc.tier(), Some(PerformanceTier::Medium));
}

#[test]
fn reconfigure_while_paused_stays_paused() {
    let (mut lc, log, _) = make(true, false);
    run_to_running(&mut lc, PerformanceTier::High, false);
    lc.set_tab_active(false);
    lc.reconfigure(PerformanceTier::High, Some(params(PerformanceTier::High, false)));
    assert_eq!(lc.state(), LifecycleState::Paused);
    assert_eq!(log.borrow().last(), Some(&Event::FrameRate(2, 0)));
}

#[test]
fn degrade_only_moves_down() {
    let (mut lc, _, _) = make(true, false);
    run_to_running(&mut lc, PerformanceTier::Medium, false);
    assert!(!lc.degrade_tier(PerformanceTier::High, params(PerformanceTier::High, false)));
    assert!(lc.degrade_tier(PerformanceTier::Low, params(PerformanceTier::Low, false)));
    assert_eq!(lc.tier(), Some(PerformanceTier::Low));
}

#[test]
fn reduced_motion_settles_on_static_without_engine() {
    let (mut lc, log, _) = make(true, false);
    lc.begin_probing();
    lc.resolve_tier(PerformanceTier::High, None);
    assert_eq!(lc.render_mode(), RenderMode::Static);
    assert_eq!(lc.fallback(), Some(FallbackReason::ReducedMotion));
    lc.poll_engine();
    assert_eq!(lc.initialize(), RenderMode::Static);
    assert!(log.borrow().is_empty());

    // Preference flips back: rebuild animated.
    let mode = lc.reconfigure(PerformanceTier::High, Some(params(PerformanceTier::High, false)));
    assert_eq!(mode, RenderMode::Animated);
}

#[test]
fn resize_forwards_to_live_handle() {
    let (mut lc, log, _) = make(true, false);
    lc.resize();
    run_to_running(&mut lc, PerformanceTier::High, false);
    lc.resize();
    assert_eq!(*log.borrow(), vec![Event::Created(1), Event::Resized(1)]);
}

#[test]
fn dropping_the_lifecycle_releases_the_handle() {
    let (mut lc, log, _) = make(true, false);
    run_to_running(&mut lc, PerformanceTier::High, false);
    drop(lc);
    assert_eq!(log.borrow().last(), Some(&Event::Destroyed(1)));
}

#[test]
fn begin_probing_only_once() {
    let (mut lc, _, _) = make(true, false);
    assert!(lc.begin_probing());
    assert!(!lc.begin_probing());
}

#[test]
fn runtime_failure_tears_down_to_static() {
    let (mut lc, log, _) = make(true, false);
    run_to_running(&mut lc, PerformanceTier::High, false);
    lc.report_failure(BackdropError::EngineRuntime {
        effect: "mock".into(),
        reason: "draw threw".into(),
    });
    assert_eq!(lc.render_mode(), RenderMode::Static);
    assert_eq!(lc.fallback(), Some(FallbackReason::RuntimeFailure));
    assert_eq!(log.borrow().last(), Some(&Event::Destroyed(1)));
    // Nothing live to fail any more.
    lc.report_failure(BackdropError::MountDetached);
    assert!(matches!(
        lc.last_error(),
        Some(BackdropError::EngineRuntime { .. })
    ));
}

#[test]
fn leaving_reduced_motion_waits_for_engine_script() {
    let (mut lc, log, loaded) = make(false, false);
    lc.begin_probing();
    lc.resolve_tier(PerformanceTier::High, None);
    assert_eq!(lc.fallback(), Some(FallbackReason::ReducedMotion));

    let mode = lc.reconfigure(PerformanceTier::High, Some(params(PerformanceTier::High, false)));
    assert_eq!(mode, RenderMode::Static);
    assert_eq!(lc.state(), LifecycleState::Probing);
    assert_eq!(lc.fallback(), None);
    assert!(lc.last_error().is_none());

    // The load step runs as on first mount: retries, then injection.
    for _ in 0..3 {
        assert!(matches!(lc.poll_engine(), LoadStep::Retry { .. }));
    }
    assert_eq!(lc.poll_engine(), LoadStep::InjectScriptAndProceed);
    *loaded.borrow_mut() = true;
    assert_eq!(lc.initialize(), RenderMode::Animated);
    assert_eq!(*log.borrow(), vec![Event::Created(1)]);
}

#[test]
fn rebuild_after_failed_load_does_not_poll_again() {
    let (mut lc, _, _) = make(false, false);
    lc.begin_probing();
    lc.resolve_tier(PerformanceTier::High, Some(params(PerformanceTier::High, false)));
    for _ in 0..4 {
        lc.poll_engine();
    }
    lc.initialize();
    assert_eq!(lc.fallback(), Some(FallbackReason::EngineUnavailable));
    lc.reconfigure(PerformanceTier::Medium, Some(params(PerformanceTier::Medium, false)));
    assert_eq!(lc.state(), LifecycleState::Destroyed);
    assert_eq!(lc.fallback(), Some(FallbackReason::EngineUnavailable));
}

#[test]
fn degrade_with_identical_parameters_keeps_instance() {
    let base = BaseConfig::default();
    let forced = |tier| compute_parameters(tier, &base, true, true);
    let (mut lc, log, _) = make(true, false);
    lc.begin_probing();
    lc.resolve_tier(PerformanceTier::High, Some(forced(PerformanceTier::High)));
    lc.poll_engine();
    assert_eq!(lc.initialize(), RenderMode::Animated);

    let mut tier = PerformanceTier::High;
    while tier != PerformanceTier::VeryLow {
        let next = tier.step_down();
        assert_eq!(forced(next), forced(tier));
        assert!(lc.degrade_tier(next, forced(next)));
        assert_eq!(lc.tier(), Some(next));
        tier = next;
    }
    assert_eq!(tier, PerformanceTier::VeryLow);
    assert_eq!(lc.state(), LifecycleState::Running);
    assert_eq!(*log.borrow(), vec![Event::Created(1)]);
}
