// audit.rs — Audit subcommands: verify, tail.

use clap::Subcommand;

use ga_audit::{AuditError, GraduationLog};

use crate::context::GaContext;

#[derive(Subcommand)]
pub enum AuditCommands {
    /// Verify the graduation log hash chain integrity.
    Verify,
    /// Show recent graduation events.
    Tail {
        /// Number of events to show.
        #[arg(short, default_value = "10")]
        n: usize,
        /// Only events for this agent.
        #[arg(long)]
        agent: Option<String>,
    },
}

pub fn execute(cmd: &AuditCommands, ctx: &GaContext) -> anyhow::Result<()> {
    let path = &ctx.paths.graduation_log;
    if !path.exists() {
        println!("No graduation log found at {}", path.display());
        return Ok(());
    }

    match cmd {
        AuditCommands::Verify => match GraduationLog::verify_chain(path) {
            Ok(()) => {
                let events = GraduationLog::read_all(path)?;
                println!(
                    "Graduation log verified: {} event(s), hash chain intact.",
                    events.len()
                );
            }
            Err(AuditError::IntegrityViolation {
                line,
                expected,
                actual,
            }) => {
                println!("INTEGRITY VIOLATION at line {}:", line);
                println!("  Expected previous_hash: {}", expected);
                println!("  Actual previous_hash:   {}", actual);
                println!();
                println!("The graduation log may have been tampered with.");
                anyhow::bail!("Graduation log integrity check failed");
            }
            Err(e) => return Err(e.into()),
        },

        AuditCommands::Tail { n, agent } => {
            let events = match agent {
                Some(agent_id) => GraduationLog::read_agent(path, agent_id)?,
                None => GraduationLog::read_all(path)?,
            };
            let start = events.len().saturating_sub(*n);
            let recent = &events[start..];

            if recent.is_empty() {
                println!("No graduation events.");
                return Ok(());
            }

            println!(
                "{:<26} {:<24} {:<12} {:<12} SCORE",
                "TIMESTAMP", "AGENT", "FROM", "TO"
            );
            println!("{}", "-".repeat(84));
            for event in recent {
                println!(
                    "{:<26} {:<24} {:<12} {:<12} {:.2}",
                    event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    event.agent_id,
                    event.from_state.to_string(),
                    event.to_state.to_string(),
                    event.score,
                );
            }
        }
    }

    Ok(())
}
