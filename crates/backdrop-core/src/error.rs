use crate::tier::PerformanceTier;
use thiserror::Error;

/// Failures inside the backdrop. None of these are meant to reach the page:
/// callers log them and fall back to the static backdrop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackdropError {
    #[error("capability detection failed: {0}")]
    DetectionFailed(String),
    #[error("animation engine for `{effect}` is not loaded")]
    EngineUnavailable { effect: String },
    #[error("animation engine `{effect}` failed to start at tier {tier}: {reason}")]
    EngineConstruction {
        effect: String,
        tier: PerformanceTier,
        reason: String,
    },
    #[error("animation engine `{effect}` failed while drawing: {reason}")]
    EngineRuntime { effect: String, reason: String },
    #[error("mount node is no longer attached to the document")]
    MountDetached,
    #[error("invalid backdrop options: {0}")]
    InvalidOptions(String),
}

pub type Result<T> = std::result::Result<T, BackdropError>;
