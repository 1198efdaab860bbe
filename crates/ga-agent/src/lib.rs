//! # ga-agent
//!
//! Agent records, the maturity ladder, and store interfaces for Graduated
//! Autonomy.
//!
//! An [`Agent`] carries the two fields the governance core owns — its
//! [`MaturityLevel`] and a confidence score. [`Episode`]s are the immutable
//! behavioral history the readiness scorer consumes. The store traits are
//! the seams to external persistence; [`json_store`] provides JSON-file
//! implementations in the same one-file-per-record shape used for local
//! state elsewhere in the workspace.
//!
//! ## Key invariants
//!
//! - Agents are never deleted by this subsystem.
//! - Episodes are append-only and immutable once written.
//! - Store queries take a caller-supplied [`Deadline`]; exceeding it is a
//!   `StoreError::Timeout`, never an open-ended block.

pub mod agent;
pub mod deadline;
pub mod episode;
pub mod json_store;
pub mod maturity;
pub mod store;

pub use agent::{Agent, SYSTEM_AGENT_CATEGORY, SYSTEM_AGENT_NAME};
pub use deadline::Deadline;
pub use episode::Episode;
pub use json_store::{JsonAgentStore, JsonEpisodeStore, JsonSessionStore, JsonWorkspaceStore};
pub use maturity::MaturityLevel;
pub use store::{AgentStore, EpisodeStore, SessionStore, StoreError, WorkspaceStore};
