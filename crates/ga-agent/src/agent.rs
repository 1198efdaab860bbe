// agent.rs — The Agent record.
//
// An Agent is the unit of governance: it owns a maturity level and a
// confidence score, both mutated only by the graduation engine (or set at
// bootstrap when the resolver creates the per-workspace system default).
// This subsystem never deletes agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::maturity::MaturityLevel;

/// Name of the singleton fallback agent created per workspace.
pub const SYSTEM_AGENT_NAME: &str = "Chat Assistant";

/// Category of the singleton fallback agent.
pub const SYSTEM_AGENT_CATEGORY: &str = "system";

/// A governed agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    /// Unique identifier (stable string, e.g. "support-triage-2").
    pub agent_id: String,

    /// The workspace this agent belongs to.
    pub workspace_id: String,

    /// Human-readable name (e.g. "Chat Assistant").
    pub name: String,

    /// Coarse grouping (e.g. "system", "coding", "support").
    pub category: String,

    /// Current rung on the maturity ladder.
    pub maturity: MaturityLevel,

    /// Confidence in the current maturity placement, in [0, 1].
    /// Updated to the readiness score on every graduation transition.
    pub confidence: f64,

    /// When this agent was created.
    pub created_at: DateTime<Utc>,

    /// When this agent was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Create a new agent at the bottom of the ladder.
    pub fn new(
        agent_id: impl Into<String>,
        workspace_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            agent_id: agent_id.into(),
            workspace_id: workspace_id.into(),
            name: name.into(),
            category: category.into(),
            maturity: MaturityLevel::Student,
            confidence: 0.5,
            created_at: now,
            updated_at: now,
        }
    }

    /// The per-workspace system default agent ("Chat Assistant").
    ///
    /// Its id is derived from the workspace so fetch-or-create stays
    /// idempotent across processes.
    pub fn system_default(workspace_id: impl Into<String>) -> Self {
        let workspace_id = workspace_id.into();
        let agent_id = format!("system-default-{}", workspace_id);
        Agent::new(
            agent_id,
            workspace_id,
            SYSTEM_AGENT_NAME,
            SYSTEM_AGENT_CATEGORY,
        )
    }

    /// Record a mutation — bumps `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
