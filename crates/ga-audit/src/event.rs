// event.rs — Graduation event data model.
//
// Every maturity transition (promotion or demotion) is recorded as a
// GraduationEvent. Events form a chain: each includes a `previous_hash`
// linking it to the prior event, enabling tamper detection. HOLD decisions
// are never recorded — one event per transition, nothing else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ga_agent::MaturityLevel;

/// One maturity transition — one line in the JSONL graduation log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraduationEvent {
    /// Unique identifier for this event.
    pub event_id: Uuid,

    /// The agent that transitioned.
    pub agent_id: String,

    /// Maturity before the transition.
    pub from_state: MaturityLevel,

    /// Maturity after the transition.
    pub to_state: MaturityLevel,

    /// The readiness score that drove the decision, in [0, 1].
    pub score: f64,

    /// Why the transition happened (e.g. "readiness 0.90 cleared the
    /// intern bar", "constitutional average 0.50 below floor 0.70").
    pub rationale: String,

    /// When the transition was applied (UTC).
    pub timestamp: DateTime<Utc>,

    /// Hash of the previous event's JSON line (tamper detection).
    /// The first event in the log has this set to None.
    pub previous_hash: Option<String>,
}

impl GraduationEvent {
    /// Create an event with the current timestamp and a random UUID.
    /// `previous_hash` is filled in by the log at append time.
    pub fn new(
        agent_id: impl Into<String>,
        from_state: MaturityLevel,
        to_state: MaturityLevel,
        score: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            agent_id: agent_id.into(),
            from_state,
            to_state,
            score,
            rationale: rationale.into(),
            timestamp: Utc::now(),
            previous_hash: None,
        }
    }

    /// Whether this event records a promotion (one rung up).
    pub fn is_promotion(&self) -> bool {
        self.from_state.is_promotion_to(self.to_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_has_no_chain_link_yet() {
        let event = GraduationEvent::new(
            "a-1",
            MaturityLevel::Student,
            MaturityLevel::Intern,
            0.9,
            "cleared the intern bar",
        );
        assert!(event.previous_hash.is_none());
        assert!(event.is_promotion());
    }

    #[test]
    fn demotion_is_not_a_promotion() {
        let event = GraduationEvent::new(
            "a-1",
            MaturityLevel::Supervised,
            MaturityLevel::Student,
            0.3,
            "constitutional average below floor",
        );
        assert!(!event.is_promotion());
    }

    #[test]
    fn serialization_round_trip() {
        let event = GraduationEvent::new(
            "a-1",
            MaturityLevel::Intern,
            MaturityLevel::Supervised,
            0.85,
            "cleared the supervised bar",
        );
        let json = serde_json::to_string(&event).unwrap();
        let restored: GraduationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, restored);
    }
}
