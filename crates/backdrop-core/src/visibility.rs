//! Viewport and tab visibility gating.

/// Both flags must be true for the effect to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityState {
    pub in_viewport: bool,
    pub tab_active: bool,
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self {
            in_viewport: true,
            tab_active: true,
        }
    }
}

impl VisibilityState {
    pub fn is_visible(&self) -> bool {
        self.in_viewport && self.tab_active
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityChange {
    Pause,
    Resume,
    Unchanged,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VisibilityTracker {
    state: VisibilityState,
}

impl VisibilityTracker {
    pub fn new(initial: VisibilityState) -> Self {
        Self { state: initial }
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn set_in_viewport(&mut self, in_viewport: bool) -> VisibilityChange {
        let next = VisibilityState {
            in_viewport,
            ..self.state
        };
        self.apply(next)
    }

    pub fn set_tab_active(&mut self, tab_active: bool) -> VisibilityChange {
        let next = VisibilityState {
            tab_active,
            ..self.state
        };
        self.apply(next)
    }

    fn apply(&mut self, next: VisibilityState) -> VisibilityChange {
        let was = self.state.is_visible();
        self.state = next;
        match (was, next.is_visible()) {
            (true, false) => VisibilityChange::Pause,
            (false, true) => VisibilityChange::Resume,
            _ => VisibilityChange::Unchanged,
        }
    }
}
