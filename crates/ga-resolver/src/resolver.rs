// resolver.rs — Governing-agent resolution.
//
// A request may arrive with an explicit agent id, a session, or nothing
// but a workspace. The resolver walks a fixed fallback chain and stops at
// the first level that produces a live agent, recording every attempt in
// an ordered trace:
//
//   1. explicit agent id        → "explicit_agent_id"
//   2. session's pinned agent   → "session_agent"
//   3. workspace default        → "workspace_default"
//   4. system default (created) → "system_default"
//
// Store failures at a level are caught and fall through to the next level
// (fail-open per level); if every level fails the result is no agent and
// the caller must deny the action (fail-closed overall). resolve() itself
// never returns an error.

use std::sync::{Arc, Mutex};

use tracing::warn;

use ga_agent::{
    Agent, AgentStore, SessionStore, StoreError, WorkspaceStore, SYSTEM_AGENT_CATEGORY,
    SYSTEM_AGENT_NAME,
};

/// The inputs resolution works from.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub user_id: String,
    pub workspace_id: String,
    pub session_id: Option<String>,
    pub requested_agent_id: Option<String>,
    /// The action being authorized — carried for log context only.
    pub action: String,
}

/// The outcome of a resolution attempt.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The governing agent, or `None` when every level failed.
    pub agent: Option<Agent>,
    /// One note per attempted level, in order.
    pub trace: Vec<String>,
}

/// Resolves which agent governs a request.
pub struct AgentResolver {
    agents: Arc<dyn AgentStore>,
    sessions: Arc<dyn SessionStore>,
    workspaces: Arc<dyn WorkspaceStore>,
    /// Serializes system-default creation per process. The deterministic
    /// default agent id keeps creation idempotent across processes.
    bootstrap: Mutex<()>,
}

impl AgentResolver {
    pub fn new(
        agents: Arc<dyn AgentStore>,
        sessions: Arc<dyn SessionStore>,
        workspaces: Arc<dyn WorkspaceStore>,
    ) -> Self {
        Self {
            agents,
            sessions,
            workspaces,
            bootstrap: Mutex::new(()),
        }
    }

    /// Walk the fallback chain. Never errors; inspect `trace` for the path
    /// taken and `agent == None` for total failure.
    pub fn resolve(&self, request: &ResolveRequest) -> Resolution {
        let mut trace = Vec::new();

        // Level 1: explicit agent id.
        if let Some(requested) = &request.requested_agent_id {
            match self.agents.get(requested) {
                Ok(Some(agent)) => {
                    trace.push("explicit_agent_id".to_string());
                    return Resolution {
                        agent: Some(agent),
                        trace,
                    };
                }
                Ok(None) => trace.push("explicit_agent_id_not_found".to_string()),
                Err(err) => {
                    warn!(agent_id = %requested, error = %err, "explicit agent lookup failed");
                    trace.push("explicit_agent_id_not_found".to_string());
                }
            }
        }

        // Level 2: the session's pinned agent.
        if let Some(session_id) = &request.session_id {
            match self.session_agent(session_id) {
                Ok(Some(agent)) => {
                    trace.push("session_agent".to_string());
                    return Resolution {
                        agent: Some(agent),
                        trace,
                    };
                }
                Ok(None) => trace.push("no_session_agent".to_string()),
                Err(err) => {
                    warn!(session_id, error = %err, "session agent lookup failed");
                    trace.push("no_session_agent".to_string());
                }
            }
        }

        // Level 3: the workspace default.
        match self.workspace_default(&request.workspace_id) {
            Ok(Some(agent)) => {
                trace.push("workspace_default".to_string());
                return Resolution {
                    agent: Some(agent),
                    trace,
                };
            }
            Ok(None) => trace.push("no_workspace_default".to_string()),
            Err(err) => {
                warn!(workspace_id = %request.workspace_id, error = %err, "workspace default lookup failed");
                trace.push("no_workspace_default".to_string());
            }
        }

        // Level 4: fetch-or-create the per-workspace system default.
        match self.system_default(&request.workspace_id) {
            Ok(agent) => {
                trace.push("system_default".to_string());
                Resolution {
                    agent: Some(agent),
                    trace,
                }
            }
            Err(err) => {
                warn!(workspace_id = %request.workspace_id, error = %err, "system default bootstrap failed");
                trace.push("resolution_failed".to_string());
                Resolution { agent: None, trace }
            }
        }
    }

    /// Pin an agent to a session; read back by resolution level 2.
    pub fn set_session_agent(&self, session_id: &str, agent_id: &str) -> Result<(), StoreError> {
        self.sessions.set_session_agent(session_id, agent_id)
    }

    /// Set a workspace's default agent; read back by resolution level 3.
    pub fn set_workspace_default_agent(
        &self,
        workspace_id: &str,
        agent_id: &str,
    ) -> Result<(), StoreError> {
        self.workspaces.set_default_agent(workspace_id, agent_id)
    }

    fn session_agent(&self, session_id: &str) -> Result<Option<Agent>, StoreError> {
        let Some(agent_id) = self.sessions.session_agent(session_id)? else {
            return Ok(None);
        };
        self.agents.get(&agent_id)
    }

    fn workspace_default(&self, workspace_id: &str) -> Result<Option<Agent>, StoreError> {
        let Some(agent_id) = self.workspaces.default_agent(workspace_id)? else {
            return Ok(None);
        };
        self.agents.get(&agent_id)
    }

    /// Fetch-or-create the singleton "Chat Assistant" for a workspace.
    ///
    /// Idempotent: a second call finds the existing record instead of
    /// creating a duplicate.
    fn system_default(&self, workspace_id: &str) -> Result<Agent, StoreError> {
        let _bootstrap = self.bootstrap.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) =
            self.agents
                .find_default(workspace_id, SYSTEM_AGENT_CATEGORY, SYSTEM_AGENT_NAME)?
        {
            return Ok(existing);
        }

        let agent = Agent::system_default(workspace_id);
        self.agents.upsert(&agent)?;
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ga_agent::{JsonAgentStore, JsonSessionStore, JsonWorkspaceStore, MaturityLevel};
    use serde_json::Value;
    use tempfile::tempdir;

    struct Fixture {
        agents: Arc<JsonAgentStore>,
        resolver: AgentResolver,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let agents = Arc::new(JsonAgentStore::new(dir.path().join("agents")).unwrap());
        let sessions = Arc::new(JsonSessionStore::new(dir.path().join("sessions")).unwrap());
        let workspaces = Arc::new(JsonWorkspaceStore::new(dir.path().join("workspaces")).unwrap());
        let resolver = AgentResolver::new(agents.clone(), sessions, workspaces);
        Fixture {
            agents,
            resolver,
            _dir: dir,
        }
    }

    fn request(workspace_id: &str) -> ResolveRequest {
        ResolveRequest {
            user_id: "u-1".to_string(),
            workspace_id: workspace_id.to_string(),
            action: "reply".to_string(),
            ..ResolveRequest::default()
        }
    }

    #[test]
    fn explicit_agent_id_short_circuits() {
        let fix = fixture();
        fix.agents
            .upsert(&Agent::new("a-1", "ws-1", "Helper", "support"))
            .unwrap();

        let mut req = request("ws-1");
        req.requested_agent_id = Some("a-1".to_string());

        let resolution = fix.resolver.resolve(&req);
        assert_eq!(resolution.agent.unwrap().agent_id, "a-1");
        assert_eq!(resolution.trace, vec!["explicit_agent_id"]);
    }

    #[test]
    fn missing_explicit_id_falls_through() {
        let fix = fixture();
        let mut req = request("ws-1");
        req.requested_agent_id = Some("ghost".to_string());

        let resolution = fix.resolver.resolve(&req);
        // Falls all the way to the system default.
        assert_eq!(
            resolution.trace,
            vec![
                "explicit_agent_id_not_found",
                "no_workspace_default",
                "system_default"
            ]
        );
        assert_eq!(resolution.agent.unwrap().name, SYSTEM_AGENT_NAME);
    }

    #[test]
    fn session_agent_resolves_at_level_two() {
        let fix = fixture();
        fix.agents
            .upsert(&Agent::new("a-2", "ws-1", "Helper", "support"))
            .unwrap();
        fix.resolver.set_session_agent("s-1", "a-2").unwrap();

        let mut req = request("ws-1");
        req.session_id = Some("s-1".to_string());

        let resolution = fix.resolver.resolve(&req);
        assert_eq!(resolution.agent.unwrap().agent_id, "a-2");
        assert_eq!(resolution.trace, vec!["session_agent"]);
    }

    #[test]
    fn session_pointing_at_dead_agent_falls_through() {
        let fix = fixture();
        fix.resolver.set_session_agent("s-1", "deleted").unwrap();

        let mut req = request("ws-1");
        req.session_id = Some("s-1".to_string());

        let resolution = fix.resolver.resolve(&req);
        assert_eq!(resolution.trace[0], "no_session_agent");
        assert_eq!(resolution.agent.unwrap().name, SYSTEM_AGENT_NAME);
    }

    #[test]
    fn workspace_default_resolves_at_level_three() {
        let fix = fixture();
        fix.agents
            .upsert(&Agent::new("a-3", "ws-1", "Helper", "support"))
            .unwrap();
        fix.resolver
            .set_workspace_default_agent("ws-1", "a-3")
            .unwrap();

        let resolution = fix.resolver.resolve(&request("ws-1"));
        assert_eq!(resolution.agent.unwrap().agent_id, "a-3");
        assert_eq!(resolution.trace, vec!["workspace_default"]);
    }

    #[test]
    fn system_default_is_created_once_and_reused() {
        let fix = fixture();

        let first = fix.resolver.resolve(&request("ws-1"));
        let second = fix.resolver.resolve(&request("ws-1"));

        let first = first.agent.unwrap();
        let second = second.agent.unwrap();
        assert_eq!(first.agent_id, second.agent_id);
        assert_eq!(first.name, SYSTEM_AGENT_NAME);
        assert_eq!(first.category, SYSTEM_AGENT_CATEGORY);
        assert_eq!(first.maturity, MaturityLevel::Student);
        assert!((first.confidence - 0.5).abs() < f64::EPSILON);

        // Exactly one record in the store.
        let found = fix
            .agents
            .find_default("ws-1", SYSTEM_AGENT_CATEGORY, SYSTEM_AGENT_NAME)
            .unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn system_defaults_are_scoped_per_workspace() {
        let fix = fixture();
        let one = fix.resolver.resolve(&request("ws-1")).agent.unwrap();
        let two = fix.resolver.resolve(&request("ws-2")).agent.unwrap();
        assert_ne!(one.agent_id, two.agent_id);
        assert_eq!(one.workspace_id, "ws-1");
        assert_eq!(two.workspace_id, "ws-2");
    }

    #[test]
    fn full_chain_trace_in_order() {
        let fix = fixture();
        let mut req = request("ws-1");
        req.requested_agent_id = Some("ghost".to_string());
        req.session_id = Some("never-seen".to_string());

        let resolution = fix.resolver.resolve(&req);
        assert_eq!(
            resolution.trace,
            vec![
                "explicit_agent_id_not_found",
                "no_session_agent",
                "no_workspace_default",
                "system_default"
            ]
        );
    }

    // A store that fails every call — used to prove fail-open-per-level /
    // fail-closed-overall behavior.
    struct BrokenStore;

    impl AgentStore for BrokenStore {
        fn get(&self, _agent_id: &str) -> Result<Option<Agent>, StoreError> {
            Err(StoreError::Unavailable("agent store offline".to_string()))
        }
        fn upsert(&self, _agent: &Agent) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("agent store offline".to_string()))
        }
        fn find_default(
            &self,
            _workspace_id: &str,
            _category: &str,
            _name: &str,
        ) -> Result<Option<Agent>, StoreError> {
            Err(StoreError::Unavailable("agent store offline".to_string()))
        }
    }

    impl SessionStore for BrokenStore {
        fn session_agent(&self, _session_id: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("session store offline".to_string()))
        }
        fn set_session_agent(&self, _session_id: &str, _agent_id: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("session store offline".to_string()))
        }
        fn metadata(&self, _session_id: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }
    }

    impl WorkspaceStore for BrokenStore {
        fn default_agent(&self, _workspace_id: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable(
                "workspace store offline".to_string(),
            ))
        }
        fn set_default_agent(
            &self,
            _workspace_id: &str,
            _agent_id: &str,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable(
                "workspace store offline".to_string(),
            ))
        }
        fn metadata(&self, _workspace_id: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }
    }

    #[test]
    fn every_level_failing_resolves_to_none() {
        let resolver = AgentResolver::new(
            Arc::new(BrokenStore),
            Arc::new(BrokenStore),
            Arc::new(BrokenStore),
        );

        let mut req = request("ws-1");
        req.requested_agent_id = Some("a-1".to_string());
        req.session_id = Some("s-1".to_string());

        let resolution = resolver.resolve(&req);
        assert!(resolution.agent.is_none());
        assert_eq!(
            resolution.trace,
            vec![
                "explicit_agent_id_not_found",
                "no_session_agent",
                "no_workspace_default",
                "resolution_failed"
            ]
        );
    }
}
