//! # ga-cli
//!
//! Command-line interface for Graduated Autonomy.
//!
//! Inspect and exercise the governance core from a terminal:
//! - `ga agent list/show/create/set-session/set-default` — manage agents
//! - `ga episode add` — record a behavioral episode
//! - `ga authorize` — run one authorization decision end to end
//! - `ga score` — print an agent's readiness breakdown
//! - `ga evaluate` — run the graduation engine for an agent
//! - `ga audit verify/tail` — inspect the tamper-evident graduation log

mod commands;
mod context;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use context::GaContext;

/// Graduated Autonomy CLI — govern agent maturity and permissions.
#[derive(Parser)]
#[command(name = "ga", version, about)]
struct Cli {
    /// State directory (defaults to .ga in the current directory).
    #[arg(long, default_value = ".ga")]
    state_dir: PathBuf,

    /// Governance config YAML (defaults to built-in tables).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage agents.
    Agent {
        #[command(subcommand)]
        command: commands::agent::AgentCommands,
    },
    /// Record behavioral episodes.
    Episode {
        #[command(subcommand)]
        command: commands::episode::EpisodeCommands,
    },
    /// Authorize one action request.
    Authorize(commands::authorize::AuthorizeArgs),
    /// Print an agent's readiness breakdown.
    Score {
        /// The agent to score.
        agent_id: String,
    },
    /// Run the graduation engine for an agent.
    Evaluate {
        /// The agent to evaluate.
        agent_id: String,
    },
    /// Inspect the graduation log.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommands,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let ctx = GaContext::open(&cli.state_dir, cli.config.as_deref())?;

    // Explicit cache lifecycle: the sweeper starts with the process and
    // stops when this handle drops at the end of main.
    let _sweeper = ctx.start_sweeper()?;

    match &cli.command {
        Commands::Agent { command } => commands::agent::execute(command, &ctx),
        Commands::Episode { command } => commands::episode::execute(command, &ctx),
        Commands::Authorize(args) => commands::authorize::execute(args, &ctx),
        Commands::Score { agent_id } => commands::graduate::score(agent_id, &ctx),
        Commands::Evaluate { agent_id } => commands::graduate::evaluate(agent_id, &ctx),
        Commands::Audit { command } => commands::audit::execute(command, &ctx),
    }
}
