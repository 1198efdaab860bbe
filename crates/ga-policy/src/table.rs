// table.rs — The maturity → complexity policy table.
//
// The table is data, not code: which complexities a maturity level covers
// (and where a human approval gate applies) is supplied by configuration.
// Changing the ladder's permissions is a config change, not a code change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ga_agent::MaturityLevel;

use crate::complexity::ActionComplexity;
use crate::outcome::{AuthzOutcome, DenialReason};

/// What one maturity level is allowed to do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MaturityGrant {
    /// The highest complexity this level may perform.
    pub max_complexity: ActionComplexity,

    /// If set, actions at or above this complexity are allowed but must
    /// pass a human approval gate before execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_required_at: Option<ActionComplexity>,
}

/// The full maturity → grant map.
///
/// `BTreeMap` keeps YAML output in ladder order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyTable {
    pub grants: BTreeMap<MaturityLevel, MaturityGrant>,
}

impl Default for PolicyTable {
    /// The stock ladder: Student → low only; Intern adds moderate;
    /// Supervised and Autonomous add high, with Supervised gated behind
    /// approval at high complexity.
    fn default() -> Self {
        let mut grants = BTreeMap::new();
        grants.insert(
            MaturityLevel::Student,
            MaturityGrant {
                max_complexity: ActionComplexity::Low,
                approval_required_at: None,
            },
        );
        grants.insert(
            MaturityLevel::Intern,
            MaturityGrant {
                max_complexity: ActionComplexity::Moderate,
                approval_required_at: None,
            },
        );
        grants.insert(
            MaturityLevel::Supervised,
            MaturityGrant {
                max_complexity: ActionComplexity::High,
                approval_required_at: Some(ActionComplexity::High),
            },
        );
        grants.insert(
            MaturityLevel::Autonomous,
            MaturityGrant {
                max_complexity: ActionComplexity::High,
                approval_required_at: None,
            },
        );
        Self { grants }
    }
}

impl PolicyTable {
    /// Decide whether `maturity` covers `complexity`.
    ///
    /// Returns `Allowed` (possibly with an approval gate) or `Denied` with
    /// `maturity_insufficient`. A maturity level missing from the table is
    /// an `Unavailable` — a config gap is infrastructure failure, not a
    /// trust decision.
    pub fn permits(&self, maturity: MaturityLevel, complexity: ActionComplexity) -> AuthzOutcome {
        let Some(grant) = self.grants.get(&maturity) else {
            return AuthzOutcome::Unavailable {
                detail: format!("policy table has no grant for maturity '{}'", maturity),
            };
        };

        if complexity > grant.max_complexity {
            return AuthzOutcome::Denied {
                reason: DenialReason::MaturityInsufficient {
                    maturity,
                    complexity,
                },
            };
        }

        let approval_required = grant
            .approval_required_at
            .is_some_and(|gate| complexity >= gate);
        AuthzOutcome::Allowed { approval_required }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_is_low_only() {
        let table = PolicyTable::default();
        assert!(table
            .permits(MaturityLevel::Student, ActionComplexity::Low)
            .is_allowed());
        for complexity in [ActionComplexity::Moderate, ActionComplexity::High] {
            let outcome = table.permits(MaturityLevel::Student, complexity);
            assert!(matches!(
                outcome,
                AuthzOutcome::Denied {
                    reason: DenialReason::MaturityInsufficient { .. }
                }
            ));
        }
    }

    #[test]
    fn intern_adds_moderate() {
        let table = PolicyTable::default();
        assert!(table
            .permits(MaturityLevel::Intern, ActionComplexity::Moderate)
            .is_allowed());
        assert!(!table
            .permits(MaturityLevel::Intern, ActionComplexity::High)
            .is_allowed());
    }

    #[test]
    fn supervised_high_requires_approval() {
        let table = PolicyTable::default();
        assert_eq!(
            table.permits(MaturityLevel::Supervised, ActionComplexity::High),
            AuthzOutcome::Allowed {
                approval_required: true
            }
        );
        // Below the gate, no approval needed.
        assert_eq!(
            table.permits(MaturityLevel::Supervised, ActionComplexity::Moderate),
            AuthzOutcome::allowed()
        );
    }

    #[test]
    fn autonomous_high_needs_no_approval() {
        let table = PolicyTable::default();
        assert_eq!(
            table.permits(MaturityLevel::Autonomous, ActionComplexity::High),
            AuthzOutcome::allowed()
        );
    }

    #[test]
    fn missing_grant_is_unavailable_not_denied() {
        let table = PolicyTable {
            grants: BTreeMap::new(),
        };
        let outcome = table.permits(MaturityLevel::Student, ActionComplexity::Low);
        assert!(matches!(outcome, AuthzOutcome::Unavailable { .. }));
    }

    #[test]
    fn yaml_round_trip() {
        let table = PolicyTable::default();
        let yaml = serde_yaml::to_string(&table).unwrap();
        let restored: PolicyTable = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(table, restored);
    }
}
