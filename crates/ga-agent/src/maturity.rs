// maturity.rs — The maturity ladder.
//
// Every agent sits on an ordered trust ladder:
//
//   Student → Intern → Supervised → Autonomous
//
// Promotion moves exactly one rung at a time — an agent can never skip a
// level. Demotion is allowed to drop straight back to Student (a severe
// constitutional violation resets trust entirely).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An agent's trust tier. Controls which action complexities the agent may
/// perform unsupervised.
///
/// Deriving `PartialOrd`/`Ord` gives us ladder comparisons for free:
/// `Student < Intern < Supervised < Autonomous`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    /// New agent with no earned trust — low-complexity actions only.
    Student,
    /// Has a track record — may take moderate-complexity actions.
    Intern,
    /// Trusted for high-complexity actions, with human approval gates.
    Supervised,
    /// Fully trusted — high-complexity actions without approval.
    Autonomous,
}

impl MaturityLevel {
    /// The next rung up the ladder, or `None` at the top.
    pub fn next(&self) -> Option<MaturityLevel> {
        match self {
            MaturityLevel::Student => Some(MaturityLevel::Intern),
            MaturityLevel::Intern => Some(MaturityLevel::Supervised),
            MaturityLevel::Supervised => Some(MaturityLevel::Autonomous),
            MaturityLevel::Autonomous => None,
        }
    }

    /// Whether `next` is a single-step promotion from this level.
    pub fn is_promotion_to(&self, next: MaturityLevel) -> bool {
        self.next() == Some(next)
    }

    /// All levels in ladder order, lowest first.
    pub fn ladder() -> [MaturityLevel; 4] {
        [
            MaturityLevel::Student,
            MaturityLevel::Intern,
            MaturityLevel::Supervised,
            MaturityLevel::Autonomous,
        ]
    }

    /// The snake_case name used in serialized records and log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            MaturityLevel::Student => "student",
            MaturityLevel::Intern => "intern",
            MaturityLevel::Supervised => "supervised",
            MaturityLevel::Autonomous => "autonomous",
        }
    }
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaturityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(MaturityLevel::Student),
            "intern" => Ok(MaturityLevel::Intern),
            "supervised" => Ok(MaturityLevel::Supervised),
            "autonomous" => Ok(MaturityLevel::Autonomous),
            other => Err(format!("unknown maturity level '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_ordered() {
        assert!(MaturityLevel::Student < MaturityLevel::Intern);
        assert!(MaturityLevel::Intern < MaturityLevel::Supervised);
        assert!(MaturityLevel::Supervised < MaturityLevel::Autonomous);
    }

    #[test]
    fn next_walks_one_rung() {
        assert_eq!(MaturityLevel::Student.next(), Some(MaturityLevel::Intern));
        assert_eq!(
            MaturityLevel::Intern.next(),
            Some(MaturityLevel::Supervised)
        );
        assert_eq!(
            MaturityLevel::Supervised.next(),
            Some(MaturityLevel::Autonomous)
        );
        assert_eq!(MaturityLevel::Autonomous.next(), None);
    }

    #[test]
    fn promotion_never_skips() {
        assert!(MaturityLevel::Student.is_promotion_to(MaturityLevel::Intern));
        assert!(!MaturityLevel::Student.is_promotion_to(MaturityLevel::Supervised));
        assert!(!MaturityLevel::Student.is_promotion_to(MaturityLevel::Autonomous));
        assert!(!MaturityLevel::Intern.is_promotion_to(MaturityLevel::Intern));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&MaturityLevel::Supervised).unwrap();
        assert_eq!(json, "\"supervised\"");
        let restored: MaturityLevel = serde_json::from_str("\"autonomous\"").unwrap();
        assert_eq!(restored, MaturityLevel::Autonomous);
    }

    #[test]
    fn display_matches_from_str() {
        for level in MaturityLevel::ladder() {
            let parsed: MaturityLevel = level.to_string().parse().unwrap();
            assert_eq!(parsed, level);
        }
        assert!("principal".parse::<MaturityLevel>().is_err());
    }
}
