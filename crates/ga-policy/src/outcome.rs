// outcome.rs — Authorization outcomes.
//
// Three-way result type: Allowed, Denied, and Unavailable are distinct so
// callers can never mistake infrastructure failure for a trust decision.
// Denials always carry a structured, machine-readable reason — a caller
// gets `maturity_insufficient`, never a stack trace.

use std::fmt;

use serde::{Deserialize, Serialize};

use ga_agent::MaturityLevel;

use crate::complexity::ActionComplexity;

/// The result of an authorization check.
///
/// `#[derive(PartialEq)]` lets us use `==` to compare outcomes in tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuthzOutcome {
    /// The action is authorized. `approval_required` is set when a
    /// supervised agent takes a high-complexity action that still needs a
    /// human sign-off before execution.
    Allowed { approval_required: bool },

    /// The action is refused as a trust decision.
    Denied { reason: DenialReason },

    /// The system could not decide — infrastructure failure, not a trust
    /// decision. Callers must not execute the action, and must not record
    /// this as a denial against the agent.
    Unavailable { detail: String },
}

impl AuthzOutcome {
    /// Plain allow with no approval gate.
    pub fn allowed() -> Self {
        AuthzOutcome::Allowed {
            approval_required: false,
        }
    }

    /// Whether the action may proceed (possibly behind an approval gate).
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthzOutcome::Allowed { .. })
    }
}

/// Machine-readable reasons for a denial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenialReason {
    /// The agent's maturity does not cover the requested complexity.
    MaturityInsufficient {
        maturity: MaturityLevel,
        complexity: ActionComplexity,
    },

    /// The action name is not registered with the authorizer.
    UnknownAction { action: String },

    /// No governing agent could be resolved for the request.
    ResolutionFailed,

    /// A governance collaborator failed while checking the action.
    GovernanceCheckFailed { detail: String },
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::MaturityInsufficient { .. } => write!(f, "maturity_insufficient"),
            DenialReason::UnknownAction { .. } => write!(f, "unknown_action"),
            DenialReason::ResolutionFailed => write!(f, "resolution_failed"),
            DenialReason::GovernanceCheckFailed { detail } => {
                write!(f, "governance_check_failed: {}", detail)
            }
        }
    }
}
