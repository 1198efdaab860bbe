// json_store.rs — JSON-file-backed store implementations.
//
// Each record is stored as one JSON file: `agents/<agent_id>.json`,
// `episodes/<agent_id>/<episode_id>.json`, `sessions/<session_id>.json`,
// `workspaces/<workspace_id>.json`. This keeps records isolated and makes
// the store easy to inspect manually — no database needed.
//
// Session and workspace files hold an opaque JSON object; this subsystem
// only ever reads or writes its single key (`agent_id` /
// `default_agent_id`) and leaves everything else untouched.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::agent::Agent;
use crate::deadline::Deadline;
use crate::episode::Episode;
use crate::store::{AgentStore, EpisodeStore, SessionStore, StoreError, WorkspaceStore};

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path).map_err(|source| io_err(path, source))?;
    Ok(Some(serde_json::from_str(&json)?))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| io_err(path, source))
}

/// Agent records as one JSON file per agent.
pub struct JsonAgentStore {
    dir: PathBuf,
}

impl JsonAgentStore {
    /// Create a store backed by `dir`, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| io_err(&dir, source))?;
        Ok(Self { dir })
    }

    fn agent_file(&self, agent_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", agent_id))
    }

    /// All agents in the store, newest first. Inherent to the JSON store —
    /// the `AgentStore` trait stays at the governance core's needs.
    pub fn list(&self) -> Result<Vec<Agent>, StoreError> {
        let mut agents = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|source| io_err(&self.dir, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| io_err(&self.dir, source))?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let json = fs::read_to_string(&path).map_err(|source| io_err(&path, source))?;
            if let Ok(agent) = serde_json::from_str::<Agent>(&json) {
                agents.push(agent);
            }
        }
        agents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(agents)
    }
}

impl AgentStore for JsonAgentStore {
    fn get(&self, agent_id: &str) -> Result<Option<Agent>, StoreError> {
        read_json(&self.agent_file(agent_id))
    }

    fn upsert(&self, agent: &Agent) -> Result<(), StoreError> {
        write_json(&self.agent_file(&agent.agent_id), agent)
    }

    fn find_default(
        &self,
        workspace_id: &str,
        category: &str,
        name: &str,
    ) -> Result<Option<Agent>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| io_err(&self.dir, source))?;
        for entry in entries {
            let entry = entry.map_err(|source| io_err(&self.dir, source))?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let json = fs::read_to_string(&path).map_err(|source| io_err(&path, source))?;
            // Skip files that don't parse as agents rather than failing the scan.
            let Ok(agent) = serde_json::from_str::<Agent>(&json) else {
                debug!(path = %path.display(), "skipping non-agent file in agent store");
                continue;
            };
            if agent.workspace_id == workspace_id && agent.category == category && agent.name == name
            {
                return Ok(Some(agent));
            }
        }
        Ok(None)
    }
}

/// Episode records as one JSON file per episode, grouped per agent.
/// Files are written once and never rewritten.
pub struct JsonEpisodeStore {
    dir: PathBuf,
}

impl JsonEpisodeStore {
    /// Create a store backed by `dir`, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| io_err(&dir, source))?;
        Ok(Self { dir })
    }

    fn agent_dir(&self, agent_id: &str) -> PathBuf {
        self.dir.join(agent_id)
    }
}

impl EpisodeStore for JsonEpisodeStore {
    fn query(
        &self,
        agent_id: &str,
        window_days: u32,
        deadline: &Deadline,
    ) -> Result<Vec<Episode>, StoreError> {
        let dir = self.agent_dir(agent_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let cutoff = Utc::now() - Duration::days(i64::from(window_days));
        let mut episodes = Vec::new();

        let entries = fs::read_dir(&dir).map_err(|source| io_err(&dir, source))?;
        for entry in entries {
            if deadline.expired() {
                return Err(StoreError::Timeout);
            }
            let entry = entry.map_err(|source| io_err(&dir, source))?;
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            let json = fs::read_to_string(&path).map_err(|source| io_err(&path, source))?;
            let episode: Episode = serde_json::from_str(&json)?;
            if episode.occurred_at >= cutoff {
                episodes.push(episode);
            }
        }

        // Oldest first — scorer output must not depend on directory order.
        episodes.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(episodes)
    }

    fn append(&self, episode: &Episode) -> Result<(), StoreError> {
        let dir = self.agent_dir(&episode.agent_id);
        fs::create_dir_all(&dir).map_err(|source| io_err(&dir, source))?;
        write_json(&dir.join(format!("{}.json", episode.episode_id)), episode)
    }
}

/// Metadata-blob store keyed by id, for sessions and workspaces.
///
/// Shared mechanics: read the blob, touch one key, write it back with every
/// other key preserved.
struct JsonBlobStore {
    dir: PathBuf,
}

impl JsonBlobStore {
    fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| io_err(&dir, source))?;
        Ok(Self { dir })
    }

    fn blob_file(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn read(&self, id: &str) -> Result<Option<Value>, StoreError> {
        read_json(&self.blob_file(id))
    }

    fn read_key(&self, id: &str, key: &str) -> Result<Option<String>, StoreError> {
        let Some(blob) = self.read(id)? else {
            return Ok(None);
        };
        Ok(blob
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.to_string()))
    }

    fn write_key(&self, id: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let mut blob = match self.read(id)? {
            Some(Value::Object(map)) => map,
            // Missing or non-object blob: start fresh rather than clobbering
            // a scalar we don't understand.
            _ => Map::new(),
        };
        blob.insert(key.to_string(), Value::String(value.to_string()));
        write_json(&self.blob_file(id), &Value::Object(blob))
    }
}

/// Session metadata as one JSON blob per session.
pub struct JsonSessionStore {
    blobs: JsonBlobStore,
}

impl JsonSessionStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            blobs: JsonBlobStore::new(dir)?,
        })
    }
}

impl SessionStore for JsonSessionStore {
    fn session_agent(&self, session_id: &str) -> Result<Option<String>, StoreError> {
        self.blobs.read_key(session_id, "agent_id")
    }

    fn set_session_agent(&self, session_id: &str, agent_id: &str) -> Result<(), StoreError> {
        self.blobs.write_key(session_id, "agent_id", agent_id)
    }

    fn metadata(&self, session_id: &str) -> Result<Option<Value>, StoreError> {
        self.blobs.read(session_id)
    }
}

/// Workspace metadata as one JSON blob per workspace.
pub struct JsonWorkspaceStore {
    blobs: JsonBlobStore,
}

impl JsonWorkspaceStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            blobs: JsonBlobStore::new(dir)?,
        })
    }
}

impl WorkspaceStore for JsonWorkspaceStore {
    fn default_agent(&self, workspace_id: &str) -> Result<Option<String>, StoreError> {
        self.blobs.read_key(workspace_id, "default_agent_id")
    }

    fn set_default_agent(&self, workspace_id: &str, agent_id: &str) -> Result<(), StoreError> {
        self.blobs
            .write_key(workspace_id, "default_agent_id", agent_id)
    }

    fn metadata(&self, workspace_id: &str) -> Result<Option<Value>, StoreError> {
        self.blobs.read(workspace_id)
    }
}
