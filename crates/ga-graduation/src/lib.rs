//! # ga-graduation
//!
//! Readiness scoring and the maturity graduation state machine for
//! Graduated Autonomy.
//!
//! [`scorer::compute`] is a pure function from an episode window to a
//! [0, 1] readiness score. [`GraduationEngine`] turns that score into a
//! promote/demote/hold decision against a configured threshold table,
//! applies the transition atomically with its audit event, and
//! invalidates the agent's cached permissions.
//!
//! ## Key invariants
//!
//! - Promotions climb exactly one rung; demotion resets to Student.
//! - A transition and its [`ga_audit::GraduationEvent`] land together —
//!   partial application is never observable.
//! - Evaluations are serialized per agent id.

pub mod engine;
pub mod error;
pub mod scorer;

pub use engine::{EvaluationOutcome, GraduationAction, GraduationEngine};
pub use error::GraduationError;
pub use scorer::{compute, ReadinessBreakdown, EPISODE_SATURATION};
