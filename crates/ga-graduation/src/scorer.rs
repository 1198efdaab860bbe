// scorer.rs — Graduation-readiness scoring.
//
// A pure function from an episode slice to a [0, 1] readiness score.
// No hidden state: identical episode sets always yield identical scores,
// so the score is safe to recompute on demand or on a schedule.
//
// Weighting:
//   episodes        40%  (saturates at 10 episodes)
//   interventions   30%  (1 - intervention rate)
//   constitutional  30%  (window average; 0 with no history)
//   skill diversity +0.5% per unique skill, capped at +5%

use serde::Serialize;

use ga_agent::Episode;

/// Episode count at which the volume component saturates.
pub const EPISODE_SATURATION: usize = 10;

const EPISODE_WEIGHT: f64 = 0.40;
const INTERVENTION_WEIGHT: f64 = 0.30;
const CONSTITUTIONAL_WEIGHT: f64 = 0.30;
const SKILL_BONUS_PER_SKILL: f64 = 0.005;
const SKILL_BONUS_CAP: f64 = 0.05;

/// The readiness score with its components broken out.
///
/// `episode_count` and `average_constitutional` are carried alongside the
/// components because the graduation engine checks them against its
/// threshold table.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ReadinessBreakdown {
    /// Final score, clamped to [0, 1].
    pub score: f64,
    /// Volume component: `min(count/10, 1) * 0.40`.
    pub episodes_component: f64,
    /// Autonomy component: `(1 - intervention_rate) * 0.30`.
    pub intervention_component: f64,
    /// Compliance component: `avg(constitutional_score) * 0.30`.
    pub constitutional_component: f64,
    /// Breadth bonus: `min(unique_skills * 0.005, 0.05)`.
    pub skill_diversity_bonus: f64,
    /// Episodes in the window.
    pub episode_count: usize,
    /// Average constitutional score over the window (0 with no episodes).
    pub average_constitutional: f64,
}

/// Compute the readiness breakdown for an episode window.
///
/// Zero episodes yield a zero score across the board — absence of history
/// is never rewarded.
pub fn compute(episodes: &[Episode]) -> ReadinessBreakdown {
    let count = episodes.len();

    let episodes_component =
        (count as f64 / EPISODE_SATURATION as f64).min(1.0) * EPISODE_WEIGHT;

    let total_interventions: u64 = episodes
        .iter()
        .map(|e| u64::from(e.intervention_count))
        .sum();
    let intervention_rate = if count == 0 {
        0.0
    } else {
        total_interventions as f64 / count as f64
    };
    let intervention_component = if count == 0 {
        0.0
    } else {
        // Rates above 1.0 are possible (several interventions per episode)
        // and legitimately drive the component negative; the final score
        // clamp keeps the total in range.
        (1.0 - intervention_rate) * INTERVENTION_WEIGHT
    };

    let average_constitutional = if count == 0 {
        0.0
    } else {
        episodes.iter().map(|e| e.constitutional_score).sum::<f64>() / count as f64
    };
    let constitutional_component = average_constitutional * CONSTITUTIONAL_WEIGHT;

    let unique_skills = episodes
        .iter()
        .filter_map(|e| e.skill_id.as_deref())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    let skill_diversity_bonus = (unique_skills as f64 * SKILL_BONUS_PER_SKILL).min(SKILL_BONUS_CAP);

    let score = (episodes_component
        + intervention_component
        + constitutional_component
        + skill_diversity_bonus)
        .clamp(0.0, 1.0);

    ReadinessBreakdown {
        score,
        episodes_component,
        intervention_component,
        constitutional_component,
        skill_diversity_bonus,
        episode_count: count,
        average_constitutional,
    }
}
