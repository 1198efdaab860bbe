// context.rs — Shared CLI state: paths, config, and wired components.
//
// All state lives under a `.ga/` directory (agents, episodes, sessions,
// workspaces, graduation log). The context opens the stores and wires the
// resolver, cache, authorizer, and graduation engine the same way a
// long-running host process would — the only difference is lifetime.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context as _;

use ga_agent::{JsonAgentStore, JsonEpisodeStore, JsonSessionStore, JsonWorkspaceStore};
use ga_audit::GraduationLog;
use ga_authorizer::{ActionAuthorizer, ActionRegistry};
use ga_cache::{CacheSweeper, PermissionCache};
use ga_graduation::GraduationEngine;
use ga_policy::GovernanceConfig;
use ga_resolver::AgentResolver;

/// Filesystem layout of the `.ga/` state directory.
#[derive(Debug, Clone)]
pub struct StatePaths {
    pub agents_dir: PathBuf,
    pub episodes_dir: PathBuf,
    pub sessions_dir: PathBuf,
    pub workspaces_dir: PathBuf,
    pub graduation_log: PathBuf,
}

impl StatePaths {
    pub fn for_dir(state_dir: impl AsRef<Path>) -> Self {
        let root = state_dir.as_ref().to_path_buf();
        Self {
            agents_dir: root.join("agents"),
            episodes_dir: root.join("episodes"),
            sessions_dir: root.join("sessions"),
            workspaces_dir: root.join("workspaces"),
            graduation_log: root.join("graduation.jsonl"),
        }
    }
}

/// Everything a command needs, wired once per invocation.
pub struct GaContext {
    pub config: GovernanceConfig,
    pub paths: StatePaths,
    pub agents: Arc<JsonAgentStore>,
    pub episodes: Arc<JsonEpisodeStore>,
    pub resolver: Arc<AgentResolver>,
    pub cache: Arc<PermissionCache>,
}

impl GaContext {
    /// Open stores under `state_dir`, loading config from `config_path`
    /// when given (defaults otherwise).
    pub fn open(state_dir: &Path, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => GovernanceConfig::load(path)
                .with_context(|| format!("loading governance config from {}", path.display()))?,
            None => GovernanceConfig::default(),
        };
        let paths = StatePaths::for_dir(state_dir);

        let agents = Arc::new(JsonAgentStore::new(&paths.agents_dir)?);
        let episodes = Arc::new(JsonEpisodeStore::new(&paths.episodes_dir)?);
        let sessions = Arc::new(JsonSessionStore::new(&paths.sessions_dir)?);
        let workspaces = Arc::new(JsonWorkspaceStore::new(&paths.workspaces_dir)?);

        let resolver = Arc::new(AgentResolver::new(
            agents.clone(),
            sessions,
            workspaces,
        ));
        let cache = Arc::new(PermissionCache::new(
            config.cache.ttl(),
            config.cache.max_entries,
        ));

        Ok(Self {
            config,
            paths,
            agents,
            episodes,
            resolver,
            cache,
        })
    }

    /// Build the authorization facade.
    pub fn authorizer(&self) -> ActionAuthorizer {
        ActionAuthorizer::new(
            self.resolver.clone(),
            self.cache.clone(),
            self.config.policy.clone(),
            ActionRegistry::from_catalog(&self.config.actions),
        )
    }

    /// Build the graduation engine over the file-backed graduation log.
    pub fn engine(&self) -> anyhow::Result<GraduationEngine> {
        let log = GraduationLog::open(&self.paths.graduation_log)?;
        Ok(GraduationEngine::new(
            self.agents.clone(),
            self.episodes.clone(),
            Arc::new(Mutex::new(log)),
            self.cache.clone(),
            self.config.thresholds.clone(),
            self.config.episode_window_days,
            self.config.score_deadline(),
        ))
    }

    /// Start the background cache sweeper. One-shot commands skip this;
    /// `ga watch`-style hosts own it for their lifetime.
    pub fn start_sweeper(&self) -> std::io::Result<CacheSweeper> {
        CacheSweeper::start(
            self.cache.clone(),
            self.config.cache.sweep_interval(),
            self.config.cache.sweep_batch,
        )
    }
}
