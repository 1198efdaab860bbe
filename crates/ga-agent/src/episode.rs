// episode.rs — The Episode record.
//
// An episode is one recorded unit of agent activity: how well it adhered
// to its operating policy (constitutional score) and how often a human had
// to step in (interventions). Episodes are produced by collaborators and
// are immutable once appended — this subsystem only reads them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded unit of agent activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    /// Unique identifier for this episode.
    pub episode_id: Uuid,

    /// The agent this episode belongs to.
    pub agent_id: String,

    /// Adherence to operating policy during the episode, in [0, 1].
    pub constitutional_score: f64,

    /// Number of human corrections/overrides during the episode.
    pub intervention_count: u32,

    /// Kinds of interventions that occurred (e.g. "tone", "scope").
    /// `BTreeSet` keeps serialization order stable.
    #[serde(default)]
    pub intervention_types: BTreeSet<String>,

    /// The skill exercised, if the episode used a named skill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,

    /// When this episode occurred.
    pub occurred_at: DateTime<Utc>,
}

impl Episode {
    /// Create a clean episode (no interventions) for an agent.
    pub fn new(agent_id: impl Into<String>, constitutional_score: f64) -> Self {
        Self {
            episode_id: Uuid::new_v4(),
            agent_id: agent_id.into(),
            constitutional_score: constitutional_score.clamp(0.0, 1.0),
            intervention_count: 0,
            intervention_types: BTreeSet::new(),
            skill_id: None,
            occurred_at: Utc::now(),
        }
    }

    /// Set the intervention count and return self (builder pattern).
    pub fn with_interventions(mut self, count: u32, types: &[&str]) -> Self {
        self.intervention_count = count;
        self.intervention_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Set the skill id and return self.
    pub fn with_skill(mut self, skill_id: impl Into<String>) -> Self {
        self.skill_id = Some(skill_id.into());
        self
    }

    /// Set the occurrence time and return self.
    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }
}
