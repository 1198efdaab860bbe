// authorize.rs — Run one authorization decision end to end.

use clap::Args;

use ga_policy::{ActionComplexity, AuthzOutcome};

use crate::context::GaContext;

#[derive(Args)]
pub struct AuthorizeArgs {
    /// Workspace the request belongs to.
    #[arg(long)]
    pub workspace: String,

    /// Registered action name (e.g. "send_external_message").
    #[arg(long)]
    pub action: String,

    /// Requesting user id.
    #[arg(long, default_value = "cli")]
    pub user: String,

    /// Explicit agent id (resolution level 1).
    #[arg(long)]
    pub agent: Option<String>,

    /// Session id (resolution level 2).
    #[arg(long)]
    pub session: Option<String>,

    /// Complexity override, 1..=3 (defaults to the registered complexity).
    #[arg(long)]
    pub complexity: Option<u8>,
}

pub fn execute(args: &AuthorizeArgs, ctx: &GaContext) -> anyhow::Result<()> {
    let complexity = match args.complexity {
        Some(level) => Some(
            ActionComplexity::from_level(level)
                .ok_or_else(|| anyhow::anyhow!("complexity must be 1, 2, or 3 (got {})", level))?,
        ),
        None => None,
    };

    let authorizer = ctx.authorizer();
    let response = authorizer.authorize(&ga_authorizer::ActionRequest {
        user_id: args.user.clone(),
        workspace_id: args.workspace.clone(),
        session_id: args.session.clone(),
        requested_agent_id: args.agent.clone(),
        action: args.action.clone(),
        complexity,
    });

    match &response.outcome {
        AuthzOutcome::Allowed { approval_required } => {
            if *approval_required {
                println!("ALLOWED (human approval required)");
            } else {
                println!("ALLOWED");
            }
        }
        AuthzOutcome::Denied { reason } => println!("DENIED: {}", reason),
        AuthzOutcome::Unavailable { detail } => println!("UNAVAILABLE: {}", detail),
    }

    if let Some(agent_id) = &response.agent_id {
        println!("Agent:      {}", agent_id);
    }
    println!("Resolution: {}", response.resolution_trace.join(" -> "));
    if response.from_cache {
        println!("Source:     cache");
    }

    Ok(())
}
