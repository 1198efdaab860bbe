//! # ga-authorizer
//!
//! The action authorization facade for Graduated Autonomy.
//!
//! [`ActionAuthorizer`] gates every action an agent attempts: resolve the
//! governing agent, consult the decision cache, evaluate maturity against
//! the policy table on a miss, cache the result, respond. Actions are
//! dispatched through an explicit [`ActionRegistry`] — unregistered
//! actions are denied, never reflectively looked up.
//!
//! ## Key invariants
//!
//! - No resolvable agent → denied (`resolution_failed`), fail-closed.
//! - `Unavailable` outcomes are never cached and never read as denials.
//! - A cache hit touches no store.

pub mod authorizer;
pub mod registry;

pub use authorizer::{ActionAuthorizer, ActionRequest, AuthzResponse};
pub use registry::{ActionCheck, ActionRegistry, MaturityCheck, RegisteredAction};
