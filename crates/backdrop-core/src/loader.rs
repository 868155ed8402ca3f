//! Bounded polling for an externally loaded engine script.

use crate::constants::{ENGINE_LOAD_MAX_RETRIES, ENGINE_POLL_INTERVAL_MS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStep {
    /// Engine is present; initialise now.
    Ready,
    /// Not yet present; poll again after the delay.
    Retry { after_ms: u32 },
    /// Every retry failed: inject the script tag directly, then initialise
    /// without waiting for confirmation.
    InjectScriptAndProceed,
    /// Recovery already attempted; initialise regardless.
    Proceed,
}

#[derive(Clone, Debug)]
pub struct LoadGate {
    failures: u32,
    max_retries: u32,
    injected: bool,
}

impl Default for LoadGate {
    fn default() -> Self {
        Self::new(ENGINE_LOAD_MAX_RETRIES)
    }
}

impl LoadGate {
    pub fn new(max_retries: u32) -> Self {
        Self {
            failures: 0,
            max_retries,
            injected: false,
        }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Whether any poll has found the engine missing.
    pub fn attempted(&self) -> bool {
        self.failures > 0 || self.injected
    }

    pub fn reset(&mut self) {
        self.failures = 0;
        self.injected = false;
    }

    pub fn poll(&mut self, loaded: bool) -> LoadStep {
        if loaded {
            return LoadStep::Ready;
        }
        if self.injected {
            return LoadStep::Proceed;
        }
        self.failures += 1;
        // The first failed poll is the initial check, not a retry.
        if self.failures <= self.max_retries {
            return LoadStep::Retry {
                after_ms: ENGINE_POLL_INTERVAL_MS,
            };
        }
        self.injected = true;
        LoadStep::InjectScriptAndProceed
    }
}
