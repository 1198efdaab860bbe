// cache.rs — The permission decision cache.
//
// A thread-safe map of (agent_id, action) → cached authorization decision
// with an absolute TTL and LRU capacity eviction. One mutex guards the
// whole structure — get/set/invalidate/sweep are mutually exclusive, and
// every operation is O(1) hashing plus O(1) amortized recency upkeep.
//
// LRU bookkeeping uses a recency queue with lazy invalidation: every touch
// pushes a freshly stamped key; eviction pops entries until it finds one
// whose stamp still matches the live slot. Stale stamps are discarded in
// passing, and the queue is compacted when it outgrows the map.
//
// Contract: the cache NEVER returns an error and never panics across this
// API. Internal inconsistencies are logged and treated as misses.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use ga_agent::MaturityLevel;
use ga_policy::AuthzOutcome;

use crate::clock::{Clock, SystemClock};
use crate::stats::CacheStats;

/// A cached authorization decision.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CachedDecision {
    /// The decision that was computed.
    pub outcome: AuthzOutcome,
    /// The maturity level the decision was computed against.
    pub maturity: MaturityLevel,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CacheKey {
    agent_id: String,
    action: String,
}

struct Slot {
    decision: CachedDecision,
    cached_at: std::time::Instant,
    stamp: u64,
}

#[derive(Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    invalidations: u64,
    expirations: u64,
}

struct CacheInner {
    map: HashMap<CacheKey, Slot>,
    recency: VecDeque<(u64, CacheKey)>,
    next_stamp: u64,
    counters: Counters,
}

/// Thread-safe TTL+LRU cache of authorization decisions.
pub struct PermissionCache {
    inner: Mutex<CacheInner>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    max_entries: usize,
}

impl PermissionCache {
    /// Create a cache with the system clock.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(ttl, max_entries, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock (tests use `ManualClock`).
    pub fn with_clock(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                recency: VecDeque::new(),
                next_stamp: 0,
                counters: Counters::default(),
            }),
            clock,
            ttl,
            // A zero-capacity cache would make `set` unsatisfiable.
            max_entries: max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // A poisoned lock means a panic elsewhere while holding it; the
        // data is still usable and the never-throw contract wins.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a cached decision. Expired entries are evicted and counted
    /// as misses; hits are marked most-recently-used.
    pub fn get(&self, agent_id: &str, action: &str) -> Option<CachedDecision> {
        let key = CacheKey {
            agent_id: agent_id.to_string(),
            action: action.to_string(),
        };
        let now = self.clock.now();
        let mut inner = self.lock();

        enum Lookup {
            Miss,
            Expired,
            Hit(CachedDecision),
        }

        let lookup = match inner.map.get(&key) {
            None => Lookup::Miss,
            Some(slot) if now.duration_since(slot.cached_at) > self.ttl => Lookup::Expired,
            Some(slot) => Lookup::Hit(slot.decision.clone()),
        };

        match lookup {
            Lookup::Miss => {
                inner.counters.misses += 1;
                None
            }
            Lookup::Expired => {
                inner.map.remove(&key);
                inner.counters.expirations += 1;
                inner.counters.misses += 1;
                None
            }
            Lookup::Hit(decision) => {
                inner.counters.hits += 1;
                touch(&mut inner, key, self.max_entries);
                Some(decision)
            }
        }
    }

    /// Insert or overwrite a decision. Inserting a new key at capacity
    /// evicts the least-recently-touched entry first.
    pub fn set(&self, agent_id: &str, action: &str, decision: CachedDecision) {
        let key = CacheKey {
            agent_id: agent_id.to_string(),
            action: action.to_string(),
        };
        let now = self.clock.now();
        let mut inner = self.lock();

        if !inner.map.contains_key(&key) && inner.map.len() >= self.max_entries {
            evict_lru(&mut inner);
        }

        let stamp = next_stamp(&mut inner);
        inner.map.insert(
            key.clone(),
            Slot {
                decision,
                cached_at: now,
                stamp,
            },
        );
        push_recency(&mut inner, stamp, key, self.max_entries);
    }

    /// Remove the entry for (agent, action), or every entry for the agent
    /// when `action` is `None`. Returns how many entries were removed.
    pub fn invalidate(&self, agent_id: &str, action: Option<&str>) -> usize {
        let mut inner = self.lock();
        let removed = match action {
            Some(action) => {
                let key = CacheKey {
                    agent_id: agent_id.to_string(),
                    action: action.to_string(),
                };
                usize::from(inner.map.remove(&key).is_some())
            }
            None => {
                let before = inner.map.len();
                inner.map.retain(|key, _| key.agent_id != agent_id);
                before - inner.map.len()
            }
        };
        inner.counters.invalidations += removed as u64;
        debug!(agent_id, removed, "cache invalidation");
        removed
    }

    /// One bounded sweep step: scan up to `max_scan` entries and remove
    /// the expired ones. Returns how many were removed.
    ///
    /// The bound keeps the lock hold time short so foreground lookups are
    /// never starved by the sweeper.
    pub fn purge_expired(&self, max_scan: usize) -> usize {
        let now = self.clock.now();
        let mut inner = self.lock();

        let expired: Vec<CacheKey> = inner
            .map
            .iter()
            .take(max_scan)
            .filter(|(_, slot)| now.duration_since(slot.cached_at) > self.ttl)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.map.remove(key);
        }
        inner.counters.expirations += expired.len() as u64;
        expired.len()
    }

    /// A snapshot of the cache counters and population.
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.counters.hits,
            misses: inner.counters.misses,
            evictions: inner.counters.evictions,
            invalidations: inner.counters.invalidations,
            expirations: inner.counters.expirations,
            entries: inner.map.len(),
        }
    }

    /// Hit rate as a percentage; 0.0 when no lookups have happened.
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }
}

fn next_stamp(inner: &mut CacheInner) -> u64 {
    inner.next_stamp += 1;
    inner.next_stamp
}

/// Mark `key` most-recently-used.
fn touch(inner: &mut CacheInner, key: CacheKey, max_entries: usize) {
    let stamp = next_stamp(inner);
    if let Some(slot) = inner.map.get_mut(&key) {
        slot.stamp = stamp;
    }
    push_recency(inner, stamp, key, max_entries);
}

fn push_recency(inner: &mut CacheInner, stamp: u64, key: CacheKey, max_entries: usize) {
    inner.recency.push_back((stamp, key));

    // Lazy invalidation lets the queue accumulate stale stamps; compact
    // once it clearly outgrows the live map.
    let budget = (inner.map.len().max(max_entries)) * 4;
    if inner.recency.len() > budget.max(64) {
        compact(inner);
    }
}

/// Drop recency entries whose stamp no longer matches a live slot.
fn compact(inner: &mut CacheInner) {
    let map = &inner.map;
    inner
        .recency
        .retain(|(stamp, key)| map.get(key).is_some_and(|slot| slot.stamp == *stamp));
}

/// Remove the least-recently-touched live entry.
fn evict_lru(inner: &mut CacheInner) {
    while let Some((stamp, key)) = inner.recency.pop_front() {
        let live = inner.map.get(&key).is_some_and(|slot| slot.stamp == stamp);
        if live {
            inner.map.remove(&key);
            inner.counters.evictions += 1;
            return;
        }
        // Stale stamp — the key was touched again or removed; keep popping.
    }

    // Queue drained while the map still holds entries: bookkeeping is out
    // of sync. Recover by dropping an arbitrary entry so `set` can proceed.
    if let Some(key) = inner.map.keys().next().cloned() {
        warn!("cache recency queue out of sync; evicting arbitrary entry");
        inner.map.remove(&key);
        inner.counters.evictions += 1;
    }
}
