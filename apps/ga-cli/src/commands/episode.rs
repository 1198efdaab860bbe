// episode.rs — Episode subcommands: add.

use clap::Subcommand;

use ga_agent::{AgentStore, Episode, EpisodeStore};

use crate::context::GaContext;

#[derive(Subcommand)]
pub enum EpisodeCommands {
    /// Record one episode for an agent.
    Add {
        /// The agent the episode belongs to.
        agent_id: String,
        /// Constitutional score in [0, 1].
        #[arg(long)]
        score: f64,
        /// Number of human interventions.
        #[arg(long, default_value = "0")]
        interventions: u32,
        /// Intervention types (repeatable).
        #[arg(long = "intervention-type")]
        intervention_types: Vec<String>,
        /// Skill exercised, if any.
        #[arg(long)]
        skill: Option<String>,
    },
}

pub fn execute(cmd: &EpisodeCommands, ctx: &GaContext) -> anyhow::Result<()> {
    match cmd {
        EpisodeCommands::Add {
            agent_id,
            score,
            interventions,
            intervention_types,
            skill,
        } => {
            if ctx.agents.get(agent_id)?.is_none() {
                anyhow::bail!("agent not found: {}", agent_id);
            }

            let types: Vec<&str> = intervention_types.iter().map(String::as_str).collect();
            let mut episode =
                Episode::new(agent_id, *score).with_interventions(*interventions, &types);
            if let Some(skill) = skill {
                episode = episode.with_skill(skill);
            }

            ctx.episodes.append(&episode)?;
            println!("Recorded episode {} for {}", episode.episode_id, agent_id);
        }
    }

    Ok(())
}
