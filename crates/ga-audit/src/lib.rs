//! # ga-audit
//!
//! Append-only graduation event log for Graduated Autonomy.
//!
//! Every maturity transition is recorded as a [`GraduationEvent`] in a
//! hash-chained JSONL file — one event per transition, never mutated or
//! deleted, per-agent order preserved. [`GraduationLog::verify_chain`]
//! detects any insertion, deletion, or edit after the fact.

pub mod error;
pub mod event;
pub mod hasher;
pub mod log;

pub use error::AuditError;
pub use event::GraduationEvent;
pub use log::{AuditSink, GraduationLog, MemorySink};
