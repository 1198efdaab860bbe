//! # ga-resolver
//!
//! Governing-agent resolution for Graduated Autonomy.
//!
//! [`AgentResolver`] picks which agent's policy applies to a request by
//! walking a fixed fallback chain — explicit id, session pin, workspace
//! default, then a fetch-or-create system default — and records every
//! attempt in an ordered trace for auditability. Individual level
//! failures fall through (fail-open per level); a fully failed chain
//! yields no agent, which callers must treat as a denial (fail-closed).

pub mod resolver;

pub use resolver::{AgentResolver, Resolution, ResolveRequest};
