use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse device performance class. Ordered from weakest to strongest so
/// `a <= b` reads as "a is at most as capable as b".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceTier {
    VeryLow,
    Low,
    Medium,
    High,
}

impl PerformanceTier {
    pub const ALL: [PerformanceTier; 4] = [
        PerformanceTier::VeryLow,
        PerformanceTier::Low,
        PerformanceTier::Medium,
        PerformanceTier::High,
    ];

    /// One step down, saturating at `VeryLow`.
    pub fn step_down(self) -> PerformanceTier {
        match self {
            PerformanceTier::High => PerformanceTier::Medium,
            PerformanceTier::Medium => PerformanceTier::Low,
            PerformanceTier::Low | PerformanceTier::VeryLow => PerformanceTier::VeryLow,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PerformanceTier::VeryLow => "very-low",
            PerformanceTier::Low => "low",
            PerformanceTier::Medium => "medium",
            PerformanceTier::High => "high",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_down_saturates() {
        assert_eq!(PerformanceTier::High.step_down(), PerformanceTier::Medium);
        assert_eq!(PerformanceTier::Low.step_down(), PerformanceTier::VeryLow);
        assert_eq!(PerformanceTier::VeryLow.step_down(), PerformanceTier::VeryLow);
    }

    #[test]
    fn ordering_matches_capability() {
        assert!(PerformanceTier::VeryLow < PerformanceTier::Low);
        assert!(PerformanceTier::Medium < PerformanceTier::High);
    }
}
