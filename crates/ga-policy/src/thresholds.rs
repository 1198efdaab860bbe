// thresholds.rs — Promotion threshold table.
//
// The graduation engine is threshold-table-driven: each target level has a
// row of minimums (episode count, average constitutional score, readiness
// score). Adding a level or tuning a bar is a configuration change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ga_agent::MaturityLevel;

/// Minimums an agent must clear to be promoted *into* a level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThresholdRow {
    /// Minimum episodes within the trailing window.
    pub min_episodes: usize,

    /// Minimum average constitutional score over the window.
    pub min_constitutional_score: f64,

    /// Minimum readiness score.
    pub min_readiness: f64,
}

/// The full promotion table plus the demotion floor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionThresholds {
    /// Keyed by the *target* level of the promotion.
    pub rows: BTreeMap<MaturityLevel, ThresholdRow>,

    /// An average constitutional score below this floor demotes the agent
    /// directly to Student, regardless of current level.
    pub demotion_constitutional_floor: f64,
}

impl Default for PromotionThresholds {
    fn default() -> Self {
        let mut rows = BTreeMap::new();
        rows.insert(
            MaturityLevel::Intern,
            ThresholdRow {
                min_episodes: 10,
                min_constitutional_score: 0.70,
                min_readiness: 0.70,
            },
        );
        rows.insert(
            MaturityLevel::Supervised,
            ThresholdRow {
                min_episodes: 25,
                min_constitutional_score: 0.80,
                min_readiness: 0.80,
            },
        );
        rows.insert(
            MaturityLevel::Autonomous,
            ThresholdRow {
                min_episodes: 50,
                min_constitutional_score: 0.90,
                min_readiness: 0.90,
            },
        );
        Self {
            rows,
            demotion_constitutional_floor: 0.70,
        }
    }
}

impl PromotionThresholds {
    /// The threshold row for promoting into `target`, if one is configured.
    ///
    /// No row means no promotion path into that level — the engine holds.
    pub fn row_for(&self, target: MaturityLevel) -> Option<&ThresholdRow> {
        self.rows.get(&target)
    }
}
