// error.rs — Error types for the graduation engine.

use thiserror::Error;

use ga_agent::{MaturityLevel, StoreError};
use ga_audit::AuditError;

/// Errors that can occur evaluating or applying a graduation decision.
#[derive(Debug, Error)]
pub enum GraduationError {
    /// The agent to evaluate does not exist.
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// A store operation failed (includes deadline timeouts — callers
    /// must fail closed, not fail open).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The audit append failed after the agent was updated; the update
    /// was rolled back. The caller should retry the evaluation.
    #[error("audit append failed, transition rolled back: {source}")]
    AuditRolledBack { source: AuditError },

    /// The decision would move the agent outside the transition graph.
    /// No mutation was performed.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: MaturityLevel,
        to: MaturityLevel,
    },
}
