//! The capability every tier exposes to the layered cache.

use async_trait::async_trait;

use super::error::CacheResult;
use super::key::CacheKey;
use super::types::{TierKind, TierResult};

#[async_trait]
/// One layer of the hierarchy.
///
/// The layered cache only ever talks to tiers through this trait, so any
/// ordered list of tiers (or a fake) can be assembled into a cascade.
pub trait CacheTier: Send + Sync + std::fmt::Debug {
    /// Position of this tier in the hierarchy.
    fn kind(&self) -> TierKind;

    /// Looks up the value for `key`.
    async fn get(&self, key: &CacheKey) -> CacheResult<TierResult>;

    /// Checks existence of `key`. Tiers that can answer more cheaply than
    /// [`get`](Self::get) override this.
    async fn contains(&self, key: &CacheKey) -> CacheResult<TierResult> {
        self.get(key).await
    }

    /// Records `value` for `key`: a write for value tiers, a mark for the
    /// filter, a no-op for the read-only authoritative store.
    async fn populate(&self, key: &CacheKey, value: &str) -> CacheResult<()>;

    /// Releases held connections. Must be idempotent.
    async fn close(&self) -> CacheResult<()> {
        Ok(())
    }
}
