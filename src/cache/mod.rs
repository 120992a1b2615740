//! Cache tiers and the layered cascade over them.

pub mod authoritative;
pub mod error;
pub mod filter;
pub mod key;
pub mod layered;
pub mod recency;
pub mod shared;
pub mod stats;
pub mod tier;
pub mod types;


pub use authoritative::AuthoritativeTier;
pub use error::{CacheError, CacheResult};
pub use filter::{
    BloomBits, FilterBackend, LocalFilterBackend, MembershipFilter, RedisBloomBackend,
    ReserveOutcome,
};
#[cfg(any(test, feature = "mock"))]
pub use filter::MockFilterBackend;
pub use key::CacheKey;
#[cfg(any(test, feature = "mock"))]
pub use layered::MockTiers;
pub use layered::LayeredCache;
pub use recency::{RecencyCache, RecencyCacheHandle};
#[cfg(any(test, feature = "mock"))]
pub use shared::MockKvBackend;
pub use shared::{KvBackend, RedisKvBackend, SharedKvCache};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use tier::CacheTier;
pub use types::{
    CacheStatus, CacheValue, LayeredLookupResult, LookupMode, TierKind, TierResult,
};
