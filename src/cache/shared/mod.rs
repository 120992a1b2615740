//! Tier 2: key/value store shared by every cache instance.

pub mod backend;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

use std::time::Duration;

use async_trait::async_trait;

pub use backend::{KvBackend, RedisKvBackend};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockKvBackend;

use super::error::CacheResult;
use super::key::CacheKey;
use super::tier::CacheTier;
use super::types::{CacheValue, TierKind, TierResult};
use crate::constants::DEFAULT_TTL;

/// Shared tier over a [`KvBackend`].
///
/// Errors from the backend are surfaced as
/// [`CacheError::TierUnavailable`](super::CacheError::TierUnavailable), never
/// folded into a miss.
pub struct SharedKvCache<B: KvBackend> {
    backend: B,
    ttl: Duration,
    ttl_enabled: bool,
}

impl<B: KvBackend> SharedKvCache<B> {
    /// Creates a shared tier whose writes persist until the store evicts them.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            ttl: DEFAULT_TTL,
            ttl_enabled: false,
        }
    }

    /// Creates a shared tier whose writes expire after `ttl` (when `Some`).
    pub fn with_ttl(backend: B, ttl: Option<Duration>) -> Self {
        Self {
            backend,
            ttl: ttl.unwrap_or(DEFAULT_TTL),
            ttl_enabled: ttl.is_some(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Expiry applied by [`CacheTier::populate`], if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_enabled.then_some(self.ttl)
    }

    pub async fn get(&self, key: &str) -> CacheResult<Option<CacheValue>> {
        self.backend.get(key).await
    }

    /// Writes `key`; with `ttl_enabled` the entry expires after the configured TTL.
    pub async fn set(&self, key: &str, value: &str, ttl_enabled: bool) -> CacheResult<()> {
        let ttl = ttl_enabled.then_some(self.ttl);
        self.backend.set(key, value, ttl).await
    }
}

impl<B: KvBackend> std::fmt::Debug for SharedKvCache<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKvCache")
            .field("ttl", &self.ttl())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<B: KvBackend> CacheTier for SharedKvCache<B> {
    fn kind(&self) -> TierKind {
        TierKind::Shared
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<TierResult> {
        let value = self.backend.get(key.derived()).await?;
        Ok(TierResult::from_option(value))
    }

    async fn populate(&self, key: &CacheKey, value: &str) -> CacheResult<()> {
        self.set(key.derived(), value, self.ttl_enabled).await
    }

    async fn close(&self) -> CacheResult<()> {
        self.backend.close().await
    }
}
