// authorizer.rs — The per-action authorization facade.
//
// One call per incoming action: resolve the governing agent, consult the
// decision cache, evaluate the policy on a miss, cache the result, and
// return a structured outcome. This is the hot path — a cache hit touches
// no store at all.
//
// Fail-closed: a request with no resolvable agent is denied
// (`resolution_failed`). Infrastructure gaps surface as `Unavailable`,
// which is never cached and never counted as a trust decision.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, trace};

use ga_cache::{CachedDecision, PermissionCache};
use ga_policy::{ActionComplexity, AuthzOutcome, DenialReason, PolicyTable};
use ga_resolver::{AgentResolver, ResolveRequest};

use crate::registry::ActionRegistry;

/// One action a caller wants an agent to perform. Transient — lives for
/// the duration of a single authorization call.
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    pub user_id: String,
    pub workspace_id: String,
    pub session_id: Option<String>,
    pub requested_agent_id: Option<String>,
    /// Registered action name (e.g. "send_external_message").
    pub action: String,
    /// Explicit complexity override; defaults to the registered
    /// complexity of the action.
    pub complexity: Option<ActionComplexity>,
}

/// The authorization result plus the context that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct AuthzResponse {
    pub outcome: AuthzOutcome,
    /// The governing agent, when one was resolved.
    pub agent_id: Option<String>,
    /// The resolver's fallback trace.
    pub resolution_trace: Vec<String>,
    /// Whether the outcome came from the decision cache.
    pub from_cache: bool,
}

/// Wires resolver, cache, policy table, and action registry together.
pub struct ActionAuthorizer {
    resolver: Arc<AgentResolver>,
    cache: Arc<PermissionCache>,
    table: PolicyTable,
    registry: ActionRegistry,
}

impl ActionAuthorizer {
    pub fn new(
        resolver: Arc<AgentResolver>,
        cache: Arc<PermissionCache>,
        table: PolicyTable,
        registry: ActionRegistry,
    ) -> Self {
        Self {
            resolver,
            cache,
            table,
            registry,
        }
    }

    /// Authorize one action request.
    pub fn authorize(&self, request: &ActionRequest) -> AuthzResponse {
        let started = Instant::now();

        let resolution = self.resolver.resolve(&ResolveRequest {
            user_id: request.user_id.clone(),
            workspace_id: request.workspace_id.clone(),
            session_id: request.session_id.clone(),
            requested_agent_id: request.requested_agent_id.clone(),
            action: request.action.clone(),
        });

        let Some(agent) = resolution.agent else {
            // No governing agent — deny, never guess.
            return AuthzResponse {
                outcome: AuthzOutcome::Denied {
                    reason: DenialReason::ResolutionFailed,
                },
                agent_id: None,
                resolution_trace: resolution.trace,
                from_cache: false,
            };
        };

        if let Some(hit) = self.cache.get(&agent.agent_id, &request.action) {
            trace!(
                agent_id = %agent.agent_id,
                action = %request.action,
                elapsed_us = started.elapsed().as_micros() as u64,
                "authorization served from cache"
            );
            return AuthzResponse {
                outcome: hit.outcome,
                agent_id: Some(agent.agent_id),
                resolution_trace: resolution.trace,
                from_cache: true,
            };
        }

        let outcome = match self.registry.resolve(&request.action) {
            None => ActionRegistry::unknown(&request.action),
            Some(registered) => {
                let complexity = request.complexity.unwrap_or(registered.complexity);
                registered.check.check(&agent, complexity, &self.table)
            }
        };

        // Cache trust decisions only. Unavailable is an infrastructure
        // state — caching it would pin an outage past its resolution.
        if !matches!(outcome, AuthzOutcome::Unavailable { .. }) {
            self.cache.set(
                &agent.agent_id,
                &request.action,
                CachedDecision {
                    outcome: outcome.clone(),
                    maturity: agent.maturity,
                },
            );
        }

        debug!(
            agent_id = %agent.agent_id,
            action = %request.action,
            allowed = outcome.is_allowed(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "authorization evaluated"
        );

        AuthzResponse {
            outcome,
            agent_id: Some(agent.agent_id),
            resolution_trace: resolution.trace,
            from_cache: false,
        }
    }

    /// The decision cache, for lifecycle wiring and stats.
    pub fn cache(&self) -> &Arc<PermissionCache> {
        &self.cache
    }
}
