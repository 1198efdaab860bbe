// complexity.rs — Action complexity tiers.
//
// Every governed action declares a complexity. The policy table maps each
// maturity level to the highest complexity it may perform.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How consequential an action is. Higher tiers need more earned trust.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionComplexity {
    /// Read-only or trivially reversible actions.
    Low,
    /// Actions with contained side effects.
    Moderate,
    /// Irreversible or outward-facing actions.
    High,
}

impl ActionComplexity {
    /// Numeric tier, 1..=3 (matches the wire representation used by
    /// request producers).
    pub fn level(&self) -> u8 {
        match self {
            ActionComplexity::Low => 1,
            ActionComplexity::Moderate => 2,
            ActionComplexity::High => 3,
        }
    }

    /// Parse the numeric tier. Unknown tiers are `None` — callers must
    /// reject them explicitly rather than defaulting.
    pub fn from_level(level: u8) -> Option<ActionComplexity> {
        match level {
            1 => Some(ActionComplexity::Low),
            2 => Some(ActionComplexity::Moderate),
            3 => Some(ActionComplexity::High),
            _ => None,
        }
    }
}

impl fmt::Display for ActionComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionComplexity::Low => write!(f, "low"),
            ActionComplexity::Moderate => write!(f, "moderate"),
            ActionComplexity::High => write!(f, "high"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(ActionComplexity::Low < ActionComplexity::Moderate);
        assert!(ActionComplexity::Moderate < ActionComplexity::High);
    }

    #[test]
    fn level_round_trip() {
        for c in [
            ActionComplexity::Low,
            ActionComplexity::Moderate,
            ActionComplexity::High,
        ] {
            assert_eq!(ActionComplexity::from_level(c.level()), Some(c));
        }
        assert_eq!(ActionComplexity::from_level(0), None);
        assert_eq!(ActionComplexity::from_level(4), None);
    }
}
