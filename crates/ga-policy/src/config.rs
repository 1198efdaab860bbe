// config.rs — Governance configuration.
//
// One YAML file bundles everything operators tune: the policy table, the
// promotion thresholds, cache sizing, the registered action catalog, and
// the score-computation deadline. Defaults match the documented contract
// (60s TTL, 1000 entries, 30s sweep, 200ms score deadline, 30-day window).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::complexity::ActionComplexity;
use crate::error::PolicyError;
use crate::table::PolicyTable;
use crate::thresholds::PromotionThresholds;

/// Cache sizing and sweep cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheTuning {
    /// Absolute TTL for cached decisions, in seconds.
    pub ttl_seconds: u64,

    /// Maximum number of cached decisions before LRU eviction.
    pub max_entries: usize,

    /// How often the background sweeper wakes up, in seconds.
    pub sweep_interval_seconds: u64,

    /// Upper bound on entries scanned per sweep tick.
    pub sweep_batch: usize,
}

impl Default for CacheTuning {
    fn default() -> Self {
        Self {
            ttl_seconds: 60,
            max_entries: 1000,
            sweep_interval_seconds: 30,
            sweep_batch: 256,
        }
    }
}

impl CacheTuning {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

/// The complete governance configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GovernanceConfig {
    /// Maturity → complexity grants.
    #[serde(default)]
    pub policy: PolicyTable,

    /// Promotion bars and the demotion floor.
    #[serde(default)]
    pub thresholds: PromotionThresholds,

    /// Cache sizing and sweep cadence.
    #[serde(default)]
    pub cache: CacheTuning,

    /// Registered actions and their declared complexity. Requests may
    /// name only actions in this catalog.
    #[serde(default = "default_actions")]
    pub actions: BTreeMap<String, ActionComplexity>,

    /// Budget for readiness score computation, in milliseconds. Past it
    /// the caller fails closed.
    #[serde(default = "default_score_deadline_ms")]
    pub score_deadline_ms: u64,

    /// Trailing episode window for scoring, in days.
    #[serde(default = "default_episode_window_days")]
    pub episode_window_days: u32,
}

fn default_score_deadline_ms() -> u64 {
    200
}

fn default_episode_window_days() -> u32 {
    30
}

fn default_actions() -> BTreeMap<String, ActionComplexity> {
    // A small stock catalog; deployments replace this wholesale.
    let mut actions = BTreeMap::new();
    actions.insert("reply".to_string(), ActionComplexity::Low);
    actions.insert("summarize".to_string(), ActionComplexity::Low);
    actions.insert("schedule_followup".to_string(), ActionComplexity::Moderate);
    actions.insert("update_record".to_string(), ActionComplexity::Moderate);
    actions.insert("send_external_message".to_string(), ActionComplexity::High);
    actions.insert("execute_workflow".to_string(), ActionComplexity::High);
    actions
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            policy: PolicyTable::default(),
            thresholds: PromotionThresholds::default(),
            cache: CacheTuning::default(),
            actions: default_actions(),
            score_deadline_ms: default_score_deadline_ms(),
            episode_window_days: default_episode_window_days(),
        }
    }
}

impl GovernanceConfig {
    /// Load a config from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    /// The score deadline as a `Duration`.
    pub fn score_deadline(&self) -> Duration {
        Duration::from_millis(self.score_deadline_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_contract() {
        let config = GovernanceConfig::default();
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.cache.sweep_interval_seconds, 30);
        assert_eq!(config.score_deadline_ms, 200);
        assert_eq!(config.episode_window_days, 30);
    }

    #[test]
    fn yaml_round_trip() {
        let config = GovernanceConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let restored: GovernanceConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("governance.yaml");
        std::fs::write(
            &path,
            "score_deadline_ms: 350\nepisode_window_days: 14\n",
        )
        .unwrap();

        let config = GovernanceConfig::load(&path).unwrap();
        assert_eq!(config.score_deadline(), Duration::from_millis(350));
        assert_eq!(config.episode_window_days, 14);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.cache.max_entries, 1000);
        assert!(!config.actions.is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = GovernanceConfig::load(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(PolicyError::Io { .. })));
    }

    #[test]
    fn partial_yaml_overrides_one_section() {
        let yaml = "cache:\n  ttl_seconds: 5\n  max_entries: 10\n  sweep_interval_seconds: 1\n  sweep_batch: 4\n";
        let config: GovernanceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cache.ttl(), Duration::from_secs(5));
        assert_eq!(config.thresholds, PromotionThresholds::default());
    }
}
