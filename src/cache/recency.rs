//! Tier 1: in-process recency cache.
//!
//! Keys are derived cache keys; values are opaque strings. Eviction is strict
//! least-recently-used: maintenance runs after every access so the tier never
//! holds more than its capacity between calls.

use std::sync::Arc;

use async_trait::async_trait;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use super::error::CacheResult;
use super::key::CacheKey;
use super::tier::CacheTier;
use super::types::{CacheValue, TierKind, TierResult};
use crate::config::ConfigError;

/// Bounded LRU map of derived key → value.
pub struct RecencyCache {
    entries: Cache<String, CacheValue>,
    capacity: u64,
}

impl RecencyCache {
    /// Creates a cache holding at most `capacity` entries.
    pub fn with_capacity(capacity: u64) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidCapacity { value: capacity });
        }

        Ok(Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
            capacity,
        })
    }

    /// Returns the value for `key`, marking it most recently used.
    #[inline]
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        let value = self.entries.get(key);
        if value.is_some() {
            self.entries.run_pending_tasks();
        }
        value
    }

    /// Inserts or replaces `key`, evicting the least recently used entry when full.
    #[inline]
    pub fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.entries.run_pending_tasks();
    }

    /// Returns `true` if `key` is cached. Does not count as an access.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    #[inline]
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }

    /// Returns an iterator of currently cached keys.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(|(k, _)| k.as_ref().clone())
    }
}

impl std::fmt::Debug for RecencyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecencyCache")
            .field("entries", &self.entries.entry_count())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[async_trait]
impl CacheTier for RecencyCache {
    fn kind(&self) -> TierKind {
        TierKind::Recency
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<TierResult> {
        Ok(TierResult::from_option(RecencyCache::get(self, key.derived())))
    }

    async fn populate(&self, key: &CacheKey, value: &str) -> CacheResult<()> {
        self.set(key.derived(), value);
        Ok(())
    }
}

#[derive(Clone)]
/// Shared handle to a [`RecencyCache`], so tests and callers can inspect
/// Tier 1 while it is owned by a layered cache.
pub struct RecencyCacheHandle {
    inner: Arc<RecencyCache>,
}

impl RecencyCacheHandle {
    pub fn with_capacity(capacity: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(RecencyCache::with_capacity(capacity)?),
        })
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        self.inner.get(key)
    }

    #[inline]
    pub fn set(&self, key: &str, value: &str) {
        self.inner.set(key, value)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn clear(&self) {
        self.inner.clear()
    }

    /// Returns the number of strong references to the underlying cache.
    #[inline]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl std::fmt::Debug for RecencyCacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecencyCacheHandle")
            .field("len", &self.len())
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

#[async_trait]
impl CacheTier for RecencyCacheHandle {
    fn kind(&self) -> TierKind {
        TierKind::Recency
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<TierResult> {
        CacheTier::get(self.inner.as_ref(), key).await
    }

    async fn populate(&self, key: &CacheKey, value: &str) -> CacheResult<()> {
        self.inner.populate(key, value).await
    }
}
