// stats.rs — Cache statistics.

use serde::Serialize;

/// A point-in-time snapshot of cache counters.
///
/// Counters are cumulative since cache construction. `entries` is the
/// current population.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing (or only an expired entry).
    pub misses: u64,
    /// Entries removed under LRU capacity pressure.
    pub evictions: u64,
    /// Entries removed by explicit invalidation.
    pub invalidations: u64,
    /// Entries removed because their TTL lapsed (on lookup or by sweep).
    pub expirations: u64,
    /// Current number of live entries.
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage; 0.0 when no lookups have happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_zero_with_no_traffic() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_is_a_percentage() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_rate() - 75.0).abs() < 1e-9);
    }
}
