//! Layered cache library crate (used by the `layered` binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Cascade
//! - [`LayeredCache`] - ordered tiers with upward promotion; `basic` and `full` assemblies
//! - [`LayeredLookupResult`], [`CacheStatus`], [`LookupMode`] - lookup outcomes
//! - [`CacheTier`] - the capability every tier implements
//!
//! ## Tiers
//! - [`RecencyCache`] - Tier 1, in-process LRU
//! - [`SharedKvCache`] over [`KvBackend`] ([`RedisKvBackend`]) - Tier 2
//! - [`MembershipFilter`] over [`FilterBackend`] ([`RedisBloomBackend`],
//!   [`LocalFilterBackend`]) - Tier 3
//! - [`AuthoritativeTier`] over [`AuthoritativeStore`] ([`DgraphStore`]) - Tier 4
//!
//! ## Configuration & Errors
//! - [`CacheConfig`], [`ConfigError`] - construction options and `LAYERED_*` env loading
//! - [`CacheError`], [`StoreError`]
//!
//! ## Utilities
//! - Stable BLAKE3 key digests in [`hashing`]
//!
//! ## Test/Mock Support
//! In-memory backends are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod hashing;
pub mod store;

pub use cache::{
    AuthoritativeTier, BloomBits, CacheError, CacheKey, CacheResult, CacheStats,
    CacheStatsSnapshot, CacheStatus, CacheTier, CacheValue, FilterBackend, KvBackend,
    LayeredCache, LayeredLookupResult, LocalFilterBackend, LookupMode, MembershipFilter,
    RecencyCache, RecencyCacheHandle, RedisBloomBackend, RedisKvBackend, ReserveOutcome,
    SharedKvCache, TierKind, TierResult,
};
#[cfg(any(test, feature = "mock"))]
pub use cache::{MockFilterBackend, MockKvBackend, MockTiers};

pub use config::{CacheConfig, ConfigError};
pub use hashing::{hash_key, record_digest};
#[cfg(any(test, feature = "mock"))]
pub use store::MockAuthoritativeStore;
pub use store::{AuthoritativeStore, DgraphStore, StoreError, StoreResult};
