// agent.rs — Agent subcommands: list, show, create, set-session, set-default.

use clap::Subcommand;

use ga_agent::{Agent, AgentStore};

use crate::context::GaContext;

#[derive(Subcommand)]
pub enum AgentCommands {
    /// List all agents.
    List,
    /// Show one agent as JSON.
    Show {
        /// The agent id.
        agent_id: String,
    },
    /// Create a new agent (starts as a student).
    Create {
        /// The agent id.
        agent_id: String,
        /// Workspace the agent belongs to.
        #[arg(long)]
        workspace: String,
        /// Human-readable name.
        #[arg(long)]
        name: String,
        /// Category (e.g. "support", "coding").
        #[arg(long, default_value = "general")]
        category: String,
    },
    /// Pin an agent to a session.
    SetSession {
        /// The session id.
        session_id: String,
        /// The agent id to pin.
        agent_id: String,
    },
    /// Set a workspace's default agent.
    SetDefault {
        /// The workspace id.
        workspace_id: String,
        /// The agent id to use as default.
        agent_id: String,
    },
}

pub fn execute(cmd: &AgentCommands, ctx: &GaContext) -> anyhow::Result<()> {
    match cmd {
        AgentCommands::List => {
            let agents = ctx.agents.list()?;
            if agents.is_empty() {
                println!("No agents.");
                return Ok(());
            }
            println!(
                "{:<24} {:<12} {:<12} {:<10} NAME",
                "AGENT", "WORKSPACE", "MATURITY", "CONFIDENCE"
            );
            println!("{}", "-".repeat(80));
            for agent in agents {
                println!(
                    "{:<24} {:<12} {:<12} {:<10.2} {}",
                    agent.agent_id, agent.workspace_id, agent.maturity, agent.confidence, agent.name,
                );
            }
        }

        AgentCommands::Show { agent_id } => match ctx.agents.get(agent_id)? {
            Some(agent) => println!("{}", serde_json::to_string_pretty(&agent)?),
            None => anyhow::bail!("agent not found: {}", agent_id),
        },

        AgentCommands::Create {
            agent_id,
            workspace,
            name,
            category,
        } => {
            if ctx.agents.get(agent_id)?.is_some() {
                anyhow::bail!("agent already exists: {}", agent_id);
            }
            let agent = Agent::new(agent_id, workspace, name, category);
            ctx.agents.upsert(&agent)?;
            println!("Created agent {} ({})", agent.agent_id, agent.maturity);
        }

        AgentCommands::SetSession {
            session_id,
            agent_id,
        } => {
            ctx.resolver.set_session_agent(session_id, agent_id)?;
            println!("Session {} now governed by {}", session_id, agent_id);
        }

        AgentCommands::SetDefault {
            workspace_id,
            agent_id,
        } => {
            ctx.resolver
                .set_workspace_default_agent(workspace_id, agent_id)?;
            println!("Workspace {} default agent set to {}", workspace_id, agent_id);
        }
    }

    Ok(())
}
