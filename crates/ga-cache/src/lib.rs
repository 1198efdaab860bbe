//! # ga-cache
//!
//! Thread-safe TTL+LRU cache of authorization decisions for Graduated
//! Autonomy.
//!
//! [`PermissionCache`] answers the hot-path question "is this agent
//! allowed to take this action?" from memory: O(1) hashing, O(1)
//! amortized LRU upkeep, absolute TTL expiry, and explicit invalidation
//! when an agent's maturity changes. [`CacheSweeper`] bounds memory under
//! low query volume by sweeping expired entries on a fixed interval.
//!
//! ## Key invariants
//!
//! - A returned hit is never older than the TTL.
//! - The cache never errors and never panics across its API; internal
//!   inconsistencies are logged and treated as misses.
//! - No network or disk I/O happens inside the cache.

pub mod cache;
pub mod clock;
pub mod stats;
pub mod sweeper;

pub use cache::{CachedDecision, PermissionCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use stats::CacheStats;
pub use sweeper::CacheSweeper;
