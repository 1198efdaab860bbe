// store.rs — Store interfaces for the governance core's collaborators.
//
// Agents, episodes, sessions, and workspaces are persisted by external
// systems; the governance core talks to them through these traits. Trait
// objects at this seam keep the decision logic testable and free of any
// persistence mechanics.
//
// Error contract: `NotFound` is represented as `Ok(None)` — only
// infrastructure failures (I/O, corrupt data, exhausted deadline) are
// errors. Callers decide whether an error means "try the next fallback"
// or "fail closed".

use serde_json::Value;
use thiserror::Error;

use crate::agent::Agent;
use crate::deadline::Deadline;
use crate::episode::Episode;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file or connection-level I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Stored data could not be serialized/deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The caller-supplied deadline ran out before the operation finished.
    #[error("store operation exceeded its deadline")]
    Timeout,

    /// The backing store is unreachable or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for [`Agent`] records.
pub trait AgentStore: Send + Sync {
    /// Fetch an agent by id. `Ok(None)` when absent.
    fn get(&self, agent_id: &str) -> Result<Option<Agent>, StoreError>;

    /// Create or overwrite an agent record.
    fn upsert(&self, agent: &Agent) -> Result<(), StoreError>;

    /// Find the unique agent matching (workspace, category, name).
    /// Used for idempotent system-default bootstrap.
    fn find_default(
        &self,
        workspace_id: &str,
        category: &str,
        name: &str,
    ) -> Result<Option<Agent>, StoreError>;
}

/// Read access to the episode history (plus append for producers).
pub trait EpisodeStore: Send + Sync {
    /// Episodes for an agent within the trailing window, oldest first.
    ///
    /// Must respect `deadline`: return `StoreError::Timeout` rather than
    /// blocking past it.
    fn query(
        &self,
        agent_id: &str,
        window_days: u32,
        deadline: &Deadline,
    ) -> Result<Vec<Episode>, StoreError>;

    /// Append a new immutable episode.
    fn append(&self, episode: &Episode) -> Result<(), StoreError>;
}

/// Read/write of the single `agent_id` key in a session's otherwise
/// opaque metadata blob.
pub trait SessionStore: Send + Sync {
    /// The agent pinned to this session, if any.
    fn session_agent(&self, session_id: &str) -> Result<Option<String>, StoreError>;

    /// Pin an agent to a session (sticky across requests).
    fn set_session_agent(&self, session_id: &str, agent_id: &str) -> Result<(), StoreError>;

    /// The full metadata blob, for collaborators that own other keys.
    fn metadata(&self, session_id: &str) -> Result<Option<Value>, StoreError>;
}

/// Read/write of the single `default_agent_id` key in a workspace's
/// otherwise opaque metadata blob.
pub trait WorkspaceStore: Send + Sync {
    /// The workspace's default agent, if configured.
    fn default_agent(&self, workspace_id: &str) -> Result<Option<String>, StoreError>;

    /// Set the workspace default agent.
    fn set_default_agent(&self, workspace_id: &str, agent_id: &str) -> Result<(), StoreError>;

    /// The full metadata blob, for collaborators that own other keys.
    fn metadata(&self, workspace_id: &str) -> Result<Option<Value>, StoreError>;
}
