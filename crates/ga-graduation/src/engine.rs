// engine.rs — The graduation state machine.
//
// evaluate() walks one agent through: fetch window → score → decide →
// apply. The decision order is demotion first (a constitutional-floor
// breach drops the agent straight to Student), then promotion against the
// threshold table for the next rung, otherwise hold.
//
// Consistency contract:
// - Evaluations are serialized per agent id — two concurrent calls can
//   never both apply from the same prior state.
// - Applying is one logical transaction: agent update + audit event land
//   together. If the audit append fails, the agent write is compensated
//   and the caller gets a retryable error.
// - Cache invalidation after a transition is best-effort; a failure there
//   is bounded by one TTL window of staleness.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};

use ga_agent::{Agent, AgentStore, Deadline, EpisodeStore, MaturityLevel};
use ga_audit::{AuditSink, GraduationEvent};
use ga_cache::PermissionCache;
use ga_policy::PromotionThresholds;

use crate::error::GraduationError;
use crate::scorer::{self, ReadinessBreakdown};

/// What the engine decided for an agent.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GraduationAction {
    Promote,
    Demote,
    Hold,
}

/// The result of one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutcome {
    pub action: GraduationAction,
    pub from_state: MaturityLevel,
    pub to_state: MaturityLevel,
    pub score: f64,
    pub breakdown: ReadinessBreakdown,
}

/// Promotes, demotes, or holds agents based on their behavioral history.
pub struct GraduationEngine {
    agents: Arc<dyn AgentStore>,
    episodes: Arc<dyn EpisodeStore>,
    audit: Arc<Mutex<dyn AuditSink>>,
    cache: Arc<PermissionCache>,
    thresholds: PromotionThresholds,
    window_days: u32,
    score_deadline: Duration,
    /// Per-agent evaluation locks.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl GraduationEngine {
    pub fn new(
        agents: Arc<dyn AgentStore>,
        episodes: Arc<dyn EpisodeStore>,
        audit: Arc<Mutex<dyn AuditSink>>,
        cache: Arc<PermissionCache>,
        thresholds: PromotionThresholds,
        window_days: u32,
        score_deadline: Duration,
    ) -> Self {
        Self {
            agents,
            episodes,
            audit,
            cache,
            thresholds,
            window_days,
            score_deadline,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Evaluate one agent and apply the resulting transition, if any.
    ///
    /// HOLD performs no mutation and appends no event.
    pub fn evaluate(&self, agent_id: &str) -> Result<EvaluationOutcome, GraduationError> {
        let lock = self.agent_lock(agent_id);
        let _serialized = lock.lock().unwrap_or_else(|e| e.into_inner());

        let agent = self
            .agents
            .get(agent_id)?
            .ok_or_else(|| GraduationError::AgentNotFound(agent_id.to_string()))?;

        let deadline = Deadline::after(self.score_deadline);
        let episodes = self.episodes.query(agent_id, self.window_days, &deadline)?;
        let breakdown = scorer::compute(&episodes);

        let from = agent.maturity;
        match self.decide(&agent, &breakdown) {
            Decision::Hold => Ok(EvaluationOutcome {
                action: GraduationAction::Hold,
                from_state: from,
                to_state: from,
                score: breakdown.score,
                breakdown,
            }),
            Decision::Move {
                action,
                to,
                rationale,
            } => {
                self.apply(agent, to, &breakdown, &rationale)?;
                info!(agent_id, from = %from, to = %to, score = breakdown.score, "maturity transition applied");
                Ok(EvaluationOutcome {
                    action,
                    from_state: from,
                    to_state: to,
                    score: breakdown.score,
                    breakdown,
                })
            }
        }
    }

    fn decide(&self, agent: &Agent, breakdown: &ReadinessBreakdown) -> Decision {
        // Demotion first: a constitutional breach overrides any readiness.
        // With zero episodes there is no evidence either way — hold.
        if breakdown.episode_count > 0
            && breakdown.average_constitutional < self.thresholds.demotion_constitutional_floor
            && agent.maturity != MaturityLevel::Student
        {
            return Decision::Move {
                action: GraduationAction::Demote,
                to: MaturityLevel::Student,
                rationale: format!(
                    "constitutional average {:.2} below floor {:.2}",
                    breakdown.average_constitutional,
                    self.thresholds.demotion_constitutional_floor
                ),
            };
        }

        let Some(next) = agent.maturity.next() else {
            return Decision::Hold;
        };
        let Some(row) = self.thresholds.row_for(next) else {
            // No configured path into the next level.
            return Decision::Hold;
        };

        let clears_bar = breakdown.episode_count >= row.min_episodes
            && breakdown.average_constitutional >= row.min_constitutional_score
            && breakdown.score >= row.min_readiness;
        if clears_bar {
            Decision::Move {
                action: GraduationAction::Promote,
                to: next,
                rationale: format!(
                    "readiness {:.2} over {} episodes cleared the {} bar",
                    breakdown.score, breakdown.episode_count, next
                ),
            }
        } else {
            Decision::Hold
        }
    }

    /// Apply a transition: update the agent and append the audit event as
    /// one logical transaction, then invalidate the agent's cache entries.
    fn apply(
        &self,
        mut agent: Agent,
        to: MaturityLevel,
        breakdown: &ReadinessBreakdown,
        rationale: &str,
    ) -> Result<(), GraduationError> {
        let from = agent.maturity;
        let single_step_up = from.is_promotion_to(to);
        let reset_to_student = to == MaturityLevel::Student && from != MaturityLevel::Student;
        if !single_step_up && !reset_to_student {
            return Err(GraduationError::InvalidTransition { from, to });
        }

        let previous = agent.clone();
        agent.maturity = to;
        agent.confidence = breakdown.score.clamp(0.0, 1.0);
        agent.touch();
        self.agents.upsert(&agent)?;

        let mut event = GraduationEvent::new(&agent.agent_id, from, to, breakdown.score, rationale);
        let append_result = {
            let mut sink = self.audit.lock().unwrap_or_else(|e| e.into_inner());
            sink.append(&mut event)
        };
        if let Err(source) = append_result {
            // Compensate: put the previous record back so state and audit
            // trail stay consistent. The caller retries the whole evaluate.
            if let Err(restore) = self.agents.upsert(&previous) {
                error!(
                    agent_id = %previous.agent_id,
                    error = %restore,
                    "rollback after audit failure also failed; agent state may lead its audit trail"
                );
            }
            return Err(GraduationError::AuditRolledBack { source });
        }

        // Best-effort: stale entries expire within one TTL window anyway.
        self.cache.invalidate(&agent.agent_id, None);
        Ok(())
    }

    fn agent_lock(&self, agent_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(agent_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

enum Decision {
    Hold,
    Move {
        action: GraduationAction,
        to: MaturityLevel,
        rationale: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ga_agent::{Episode, JsonAgentStore, JsonEpisodeStore, StoreError};
    use ga_audit::{AuditError, MemorySink};
    use ga_cache::CachedDecision;
    use ga_policy::AuthzOutcome;
    use tempfile::tempdir;

    struct Fixture {
        agents: Arc<JsonAgentStore>,
        episodes: Arc<JsonEpisodeStore>,
        audit: Arc<Mutex<MemorySink>>,
        cache: Arc<PermissionCache>,
        engine: GraduationEngine,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let agents = Arc::new(JsonAgentStore::new(dir.path().join("agents")).unwrap());
        let episodes = Arc::new(JsonEpisodeStore::new(dir.path().join("episodes")).unwrap());
        let audit: Arc<Mutex<MemorySink>> = Arc::new(Mutex::new(MemorySink::default()));
        let cache = Arc::new(PermissionCache::new(Duration::from_secs(60), 100));
        let engine = GraduationEngine::new(
            agents.clone(),
            episodes.clone(),
            audit.clone(),
            cache.clone(),
            PromotionThresholds::default(),
            30,
            Duration::from_millis(200),
        );
        Fixture {
            agents,
            episodes,
            audit,
            cache,
            engine,
            _dir: dir,
        }
    }

    fn seed_agent(fix: &Fixture, maturity: MaturityLevel) -> Agent {
        let mut agent = Agent::new("a-1", "ws-1", "Helper", "support");
        agent.maturity = maturity;
        fix.agents.upsert(&agent).unwrap();
        agent
    }

    fn seed_promotable_history(fix: &Fixture) {
        // 10 clean + 5 with one intervention each → readiness 0.90.
        for _ in 0..10 {
            fix.episodes.append(&Episode::new("a-1", 1.0)).unwrap();
        }
        for _ in 0..5 {
            fix.episodes
                .append(&Episode::new("a-1", 1.0).with_interventions(1, &["scope"]))
                .unwrap();
        }
    }

    #[test]
    fn promotes_student_to_intern_and_audits_once() {
        let fix = fixture();
        seed_agent(&fix, MaturityLevel::Student);
        seed_promotable_history(&fix);

        let outcome = fix.engine.evaluate("a-1").unwrap();
        assert_eq!(outcome.action, GraduationAction::Promote);
        assert_eq!(outcome.from_state, MaturityLevel::Student);
        assert_eq!(outcome.to_state, MaturityLevel::Intern);
        assert!((outcome.score - 0.90).abs() < 1e-9);

        let agent = fix.agents.get("a-1").unwrap().unwrap();
        assert_eq!(agent.maturity, MaturityLevel::Intern);
        assert!((agent.confidence - 0.90).abs() < 1e-9);

        let events = &fix.audit.lock().unwrap().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].from_state, MaturityLevel::Student);
        assert_eq!(events[0].to_state, MaturityLevel::Intern);
    }

    #[test]
    fn promotion_invalidates_the_agents_cache_entries() {
        let fix = fixture();
        seed_agent(&fix, MaturityLevel::Student);
        seed_promotable_history(&fix);

        fix.cache.set(
            "a-1",
            "schedule_followup",
            CachedDecision {
                outcome: AuthzOutcome::Denied {
                    reason: ga_policy::DenialReason::ResolutionFailed,
                },
                maturity: MaturityLevel::Student,
            },
        );
        fix.cache.set(
            "a-2",
            "reply",
            CachedDecision {
                outcome: AuthzOutcome::allowed(),
                maturity: MaturityLevel::Intern,
            },
        );

        fix.engine.evaluate("a-1").unwrap();

        assert!(fix.cache.get("a-1", "schedule_followup").is_none());
        assert!(fix.cache.get("a-2", "reply").is_some(), "other agents keep their entries");
    }

    #[test]
    fn demotes_to_student_on_constitutional_breach() {
        let fix = fixture();
        seed_agent(&fix, MaturityLevel::Supervised);
        for _ in 0..8 {
            fix.episodes.append(&Episode::new("a-1", 0.5)).unwrap();
        }

        let outcome = fix.engine.evaluate("a-1").unwrap();
        assert_eq!(outcome.action, GraduationAction::Demote);
        assert_eq!(outcome.from_state, MaturityLevel::Supervised);
        assert_eq!(outcome.to_state, MaturityLevel::Student);

        let agent = fix.agents.get("a-1").unwrap().unwrap();
        assert_eq!(agent.maturity, MaturityLevel::Student);

        let events = &fix.audit.lock().unwrap().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].to_state, MaturityLevel::Student);
    }

    #[test]
    fn hold_mutates_nothing() {
        let fix = fixture();
        let before = seed_agent(&fix, MaturityLevel::Student);
        // 3 good episodes — under the 10-episode bar.
        for _ in 0..3 {
            fix.episodes.append(&Episode::new("a-1", 0.9)).unwrap();
        }

        let outcome = fix.engine.evaluate("a-1").unwrap();
        assert_eq!(outcome.action, GraduationAction::Hold);
        assert_eq!(outcome.from_state, outcome.to_state);

        let agent = fix.agents.get("a-1").unwrap().unwrap();
        assert_eq!(agent.maturity, before.maturity);
        assert_eq!(agent.updated_at, before.updated_at);
        assert!(fix.audit.lock().unwrap().events.is_empty());
    }

    #[test]
    fn zero_episodes_holds_even_below_floor() {
        // No evidence → no demotion: the floor only applies to observed
        // behavior, and the scorer's zero average is absence, not breach.
        let fix = fixture();
        seed_agent(&fix, MaturityLevel::Intern);

        let outcome = fix.engine.evaluate("a-1").unwrap();
        assert_eq!(outcome.action, GraduationAction::Hold);
        assert_eq!(
            fix.agents.get("a-1").unwrap().unwrap().maturity,
            MaturityLevel::Intern
        );
    }

    #[test]
    fn autonomous_agent_with_perfect_history_holds_at_the_top() {
        let fix = fixture();
        seed_agent(&fix, MaturityLevel::Autonomous);
        for _ in 0..60 {
            fix.episodes.append(&Episode::new("a-1", 1.0)).unwrap();
        }

        let outcome = fix.engine.evaluate("a-1").unwrap();
        assert_eq!(outcome.action, GraduationAction::Hold);
    }

    #[test]
    fn unknown_agent_is_an_error() {
        let fix = fixture();
        assert!(matches!(
            fix.engine.evaluate("ghost"),
            Err(GraduationError::AgentNotFound(_))
        ));
    }

    struct FailingSink;

    impl AuditSink for FailingSink {
        fn append(&mut self, _event: &mut GraduationEvent) -> Result<(), AuditError> {
            Err(AuditError::Io(std::io::Error::other("sink offline")))
        }
    }

    #[test]
    fn audit_failure_rolls_back_the_agent_update() {
        let dir = tempdir().unwrap();
        let agents = Arc::new(JsonAgentStore::new(dir.path().join("agents")).unwrap());
        let episodes = Arc::new(JsonEpisodeStore::new(dir.path().join("episodes")).unwrap());
        let cache = Arc::new(PermissionCache::new(Duration::from_secs(60), 100));
        let engine = GraduationEngine::new(
            agents.clone(),
            episodes.clone(),
            Arc::new(Mutex::new(FailingSink)),
            cache,
            PromotionThresholds::default(),
            30,
            Duration::from_millis(200),
        );

        let agent = Agent::new("a-1", "ws-1", "Helper", "support");
        agents.upsert(&agent).unwrap();
        for _ in 0..12 {
            episodes.append(&Episode::new("a-1", 1.0)).unwrap();
        }

        let result = engine.evaluate("a-1");
        assert!(matches!(
            result,
            Err(GraduationError::AuditRolledBack { .. })
        ));

        // The promotion must not be observable.
        let reloaded = agents.get("a-1").unwrap().unwrap();
        assert_eq!(reloaded.maturity, MaturityLevel::Student);
    }

    struct SlowEpisodeStore;

    impl EpisodeStore for SlowEpisodeStore {
        fn query(
            &self,
            _agent_id: &str,
            _window_days: u32,
            deadline: &Deadline,
        ) -> Result<Vec<Episode>, StoreError> {
            // Simulates a store that notices the deadline and gives up.
            std::thread::sleep(deadline.remaining());
            Err(StoreError::Timeout)
        }

        fn append(&self, _episode: &Episode) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn score_deadline_timeout_is_an_error_not_a_grant() {
        let dir = tempdir().unwrap();
        let agents = Arc::new(JsonAgentStore::new(dir.path().join("agents")).unwrap());
        agents
            .upsert(&Agent::new("a-1", "ws-1", "Helper", "support"))
            .unwrap();

        let engine = GraduationEngine::new(
            agents,
            Arc::new(SlowEpisodeStore),
            Arc::new(Mutex::new(MemorySink::default())),
            Arc::new(PermissionCache::new(Duration::from_secs(60), 10)),
            PromotionThresholds::default(),
            30,
            Duration::from_millis(10),
        );

        assert!(matches!(
            engine.evaluate("a-1"),
            Err(GraduationError::Store(StoreError::Timeout))
        ));
    }

    #[test]
    fn concurrent_evaluations_apply_exactly_one_promotion() {
        let fix = fixture();
        seed_agent(&fix, MaturityLevel::Student);
        seed_promotable_history(&fix);

        let engine = Arc::new(fix.engine);
        let mut handles = Vec::new();
        for _ in 0..4 {
            let engine = engine.clone();
            handles.push(std::thread::spawn(move || engine.evaluate("a-1").unwrap()));
        }
        let outcomes: Vec<EvaluationOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let promotions = outcomes
            .iter()
            .filter(|o| o.action == GraduationAction::Promote)
            .count();
        assert_eq!(promotions, 1, "exactly one evaluation may promote");

        assert_eq!(
            fix.agents.get("a-1").unwrap().unwrap().maturity,
            MaturityLevel::Intern
        );
        assert_eq!(fix.audit.lock().unwrap().events.len(), 1);
    }
}
