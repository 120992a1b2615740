//! Lock-free counters for the layered cache.

use std::sync::atomic::{AtomicU64, Ordering};

use super::types::TierKind;

const TIER_COUNT: usize = 4;

#[inline]
fn slot(tier: TierKind) -> usize {
    match tier {
        TierKind::Recency => 0,
        TierKind::Shared => 1,
        TierKind::Filter => 2,
        TierKind::Authoritative => 3,
    }
}

#[derive(Debug, Default)]
pub struct CacheStats {
    hits: [AtomicU64; TIER_COUNT],
    misses: AtomicU64,
    promotions: AtomicU64,
    promotion_failures: AtomicU64,
    tier_errors: [AtomicU64; TIER_COUNT],
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self, tier: TierKind) {
        self.hits[slot(tier)].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_promotion_failure(&self) {
        self.promotion_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_tier_error(&self, tier: TierKind) {
        self.tier_errors[slot(tier)].fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy. Counters are read independently, so a snapshot
    /// taken under load may be slightly inconsistent across fields.
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CacheStatsSnapshot {
            hits: [
                load(&self.hits[0]),
                load(&self.hits[1]),
                load(&self.hits[2]),
                load(&self.hits[3]),
            ],
            misses: load(&self.misses),
            promotions: load(&self.promotions),
            promotion_failures: load(&self.promotion_failures),
            tier_errors: [
                load(&self.tier_errors[0]),
                load(&self.tier_errors[1]),
                load(&self.tier_errors[2]),
                load(&self.tier_errors[3]),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStatsSnapshot {
    hits: [u64; TIER_COUNT],
    pub misses: u64,
    pub promotions: u64,
    pub promotion_failures: u64,
    tier_errors: [u64; TIER_COUNT],
}

impl CacheStatsSnapshot {
    pub fn hits(&self, tier: TierKind) -> u64 {
        self.hits[slot(tier)]
    }

    pub fn tier_errors(&self, tier: TierKind) -> u64 {
        self.tier_errors[slot(tier)]
    }

    pub fn total_hits(&self) -> u64 {
        self.hits.iter().sum()
    }

    pub fn lookups(&self) -> u64 {
        self.total_hits() + self.misses
    }

    /// Fraction of lookups answered by any tier; `0.0` before the first lookup.
    pub fn hit_ratio(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            n => self.total_hits() as f64 / n as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = CacheStats::new();
        stats.record_hit(TierKind::Recency);
        stats.record_hit(TierKind::Recency);
        stats.record_hit(TierKind::Authoritative);
        stats.record_miss();
        stats.record_promotion();
        stats.record_promotion_failure();
        stats.record_tier_error(TierKind::Shared);

        let snap = stats.snapshot();
        assert_eq!(snap.hits(TierKind::Recency), 2);
        assert_eq!(snap.hits(TierKind::Shared), 0);
        assert_eq!(snap.hits(TierKind::Authoritative), 1);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.promotions, 1);
        assert_eq!(snap.promotion_failures, 1);
        assert_eq!(snap.tier_errors(TierKind::Shared), 1);
        assert_eq!(snap.lookups(), 4);
        assert!((snap.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_hit_ratio() {
        assert_eq!(CacheStats::new().snapshot().hit_ratio(), 0.0);
    }
}
