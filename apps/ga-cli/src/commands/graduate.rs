// graduate.rs — Readiness scoring and graduation evaluation commands.

use ga_agent::{AgentStore, Deadline, EpisodeStore};
use ga_graduation::{scorer, GraduationAction};

use crate::context::GaContext;

/// Print an agent's readiness breakdown.
pub fn score(agent_id: &str, ctx: &GaContext) -> anyhow::Result<()> {
    let agent = ctx
        .agents
        .get(agent_id)?
        .ok_or_else(|| anyhow::anyhow!("agent not found: {}", agent_id))?;

    let deadline = Deadline::after(ctx.config.score_deadline());
    let episodes = ctx
        .episodes
        .query(agent_id, ctx.config.episode_window_days, &deadline)?;
    let breakdown = scorer::compute(&episodes);

    println!("Agent {} ({})", agent.agent_id, agent.maturity);
    println!(
        "  episodes ({} in {}d window):  {:+.3}",
        breakdown.episode_count, ctx.config.episode_window_days, breakdown.episodes_component
    );
    println!("  interventions:               {:+.3}", breakdown.intervention_component);
    println!(
        "  constitutional (avg {:.2}):   {:+.3}",
        breakdown.average_constitutional, breakdown.constitutional_component
    );
    println!("  skill diversity:             {:+.3}", breakdown.skill_diversity_bonus);
    println!("  readiness:                    {:.3}", breakdown.score);

    Ok(())
}

/// Run the graduation engine once for an agent.
pub fn evaluate(agent_id: &str, ctx: &GaContext) -> anyhow::Result<()> {
    let engine = ctx.engine()?;
    let outcome = engine.evaluate(agent_id)?;

    match outcome.action {
        GraduationAction::Promote => println!(
            "PROMOTED {} -> {} (readiness {:.2})",
            outcome.from_state, outcome.to_state, outcome.score
        ),
        GraduationAction::Demote => println!(
            "DEMOTED {} -> {} (readiness {:.2})",
            outcome.from_state, outcome.to_state, outcome.score
        ),
        GraduationAction::Hold => println!(
            "HOLD at {} (readiness {:.2})",
            outcome.from_state, outcome.score
        ),
    }

    Ok(())
}
