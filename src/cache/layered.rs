//! The cascade: ordered tiers, cheapest first, with upward promotion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::authoritative::AuthoritativeTier;
use super::error::{CacheError, CacheResult};
use super::filter::{FilterBackend, MembershipFilter, RedisBloomBackend};
use super::key::CacheKey;
use super::recency::RecencyCache;
use super::shared::{KvBackend, RedisKvBackend, SharedKvCache};
use super::stats::{CacheStats, CacheStatsSnapshot};
use super::tier::CacheTier;
use super::types::{CacheValue, LayeredLookupResult, LookupMode, TierKind, TierResult};
use crate::config::{CacheConfig, ConfigError, validate_node_name};
use crate::store::{AuthoritativeStore, DgraphStore};

#[cfg(any(test, feature = "mock"))]
use super::filter::MockFilterBackend;
#[cfg(any(test, feature = "mock"))]
use super::recency::RecencyCacheHandle;
#[cfg(any(test, feature = "mock"))]
use super::shared::MockKvBackend;
#[cfg(any(test, feature = "mock"))]
use crate::store::MockAuthoritativeStore;

/// Multi-tier cache for one record type (the node name).
///
/// Lookups walk the tiers in order and stop at the first definitive answer.
/// A value found in a slower tier is written into every faster tier that
/// accepts writes. Misses are never cached.
pub struct LayeredCache {
    node_name: String,
    tiers: Vec<Arc<dyn CacheTier>>,
    stats: CacheStats,
    closed: AtomicBool,
}

impl std::fmt::Debug for LayeredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredCache")
            .field("node_name", &self.node_name)
            .field("tiers", &self.tier_kinds())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl LayeredCache {
    /// Assembles a cascade from `tiers`, which must be ordered cheapest first.
    pub fn new(node_name: &str, tiers: Vec<Arc<dyn CacheTier>>) -> Result<Self, ConfigError> {
        validate_node_name(node_name)?;
        if tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }

        Ok(Self {
            node_name: node_name.to_string(),
            tiers,
            stats: CacheStats::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Recency + shared tiers.
    pub fn basic<K>(config: &CacheConfig, kv: K) -> CacheResult<Self>
    where
        K: KvBackend + 'static,
    {
        config.validate()?;

        let tiers: Vec<Arc<dyn CacheTier>> = vec![
            Arc::new(RecencyCache::with_capacity(config.lru_capacity)?),
            Arc::new(SharedKvCache::with_ttl(kv, config.effective_ttl())),
        ];

        info!(
            node = %config.node_name,
            lru_capacity = config.lru_capacity,
            ttl_enabled = config.ttl_enabled,
            "Assembled basic layered cache"
        );
        Ok(Self::new(&config.node_name, tiers)?)
    }

    /// Recency + shared + membership filter + authoritative store.
    ///
    /// Opens (or creates) the filter named after the node, so this talks to
    /// the filter backend before returning.
    pub async fn full<K, F, S>(config: &CacheConfig, kv: K, filter: F, store: S) -> CacheResult<Self>
    where
        K: KvBackend + 'static,
        F: FilterBackend + 'static,
        S: AuthoritativeStore + 'static,
    {
        config.validate_full()?;

        let recency = RecencyCache::with_capacity(config.lru_capacity)?;
        let shared = SharedKvCache::with_ttl(kv, config.effective_ttl());
        let filter = MembershipFilter::open(
            filter,
            &config.node_name,
            config.false_positive_rate,
            config.expected_elements,
        )
        .await?;
        let authoritative = AuthoritativeTier::new(store, &config.node_name)?;

        let tiers: Vec<Arc<dyn CacheTier>> = vec![
            Arc::new(recency),
            Arc::new(shared),
            Arc::new(filter),
            Arc::new(authoritative),
        ];

        info!(
            node = %config.node_name,
            lru_capacity = config.lru_capacity,
            ttl_enabled = config.ttl_enabled,
            false_positive_rate = config.false_positive_rate,
            expected_elements = config.expected_elements,
            "Assembled full layered cache"
        );
        Ok(Self::new(&config.node_name, tiers)?)
    }

    /// Basic cache against the Redis instance at `config.redis_url`.
    pub async fn connect_basic(config: &CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        let kv = RedisKvBackend::connect(&config.redis_url).await?;
        Self::basic(config, kv)
    }

    /// Full cache against Redis, RedisBloom and Dgraph as configured.
    pub async fn connect_full(config: &CacheConfig) -> CacheResult<Self> {
        config.validate_full()?;
        let kv = RedisKvBackend::connect(&config.redis_url).await?;
        let filter = RedisBloomBackend::connect(&config.bloom_url).await?;
        let store = DgraphStore::new(config.dgraph_urls.clone(), config.dgraph_timeout)?;
        Self::full(config, kv, filter, store).await
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Builds the namespaced key used at every tier.
    pub fn key(&self, raw_key: &str) -> CacheKey {
        CacheKey::new(&self.node_name, raw_key)
    }

    pub fn tiers(&self) -> &[Arc<dyn CacheTier>] {
        &self.tiers
    }

    pub fn tier_kinds(&self) -> Vec<TierKind> {
        self.tiers.iter().map(|t| t.kind()).collect()
    }

    /// First tier of the given kind.
    pub fn tier(&self, kind: TierKind) -> Option<&Arc<dyn CacheTier>> {
        self.tiers.iter().find(|t| t.kind() == kind)
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Walks the tiers for `raw_key`.
    ///
    /// In [`LookupMode::Existence`] a filter positive ends the walk with
    /// [`LayeredLookupResult::Present`] and nothing is promoted. In
    /// [`LookupMode::Value`] it is ignored and the walk continues.
    #[instrument(skip(self, raw_key), fields(node = %self.node_name, key_len = raw_key.len()))]
    pub async fn lookup(&self, raw_key: &str, mode: LookupMode) -> CacheResult<LayeredLookupResult> {
        self.ensure_open()?;
        let key = self.key(raw_key);

        for (index, tier) in self.tiers.iter().enumerate() {
            let kind = tier.kind();
            debug!(tier = %kind, "Probing tier");

            let answer = match mode {
                LookupMode::Value => tier.get(&key).await,
                LookupMode::Existence => tier.contains(&key).await,
            };
            let answer = answer.inspect_err(|e| {
                self.stats.record_tier_error(kind);
                warn!(tier = %kind, error = %e, "Tier lookup failed");
            })?;

            match answer {
                TierResult::Hit(value) => {
                    self.stats.record_hit(kind);
                    if index == 0 {
                        debug!(tier = %kind, "Cache hit");
                    } else {
                        info!(tier = %kind, "Cache hit in slower tier, promoting");
                        self.promote(&key, &value, &self.tiers[..index]).await;
                    }
                    return Ok(LayeredLookupResult::Hit { tier: kind, value });
                }
                TierResult::MaybePresent if mode == LookupMode::Existence => {
                    self.stats.record_hit(kind);
                    info!(tier = %kind, "Possibly present, value unknown");
                    return Ok(LayeredLookupResult::Present { tier: kind });
                }
                TierResult::MaybePresent => {
                    debug!(tier = %kind, "Possibly present, continuing for a value");
                }
                TierResult::Miss => {
                    debug!(tier = %kind, "Tier miss");
                }
            }
        }

        self.stats.record_miss();
        debug!("Miss in every tier");
        Ok(LayeredLookupResult::Miss)
    }

    /// Value for `raw_key`, if any tier holds it.
    pub async fn get(&self, raw_key: &str) -> CacheResult<Option<CacheValue>> {
        Ok(self.lookup(raw_key, LookupMode::Value).await?.into_value())
    }

    /// Whether `raw_key` exists. A filter positive is enough.
    pub async fn contains(&self, raw_key: &str) -> CacheResult<bool> {
        Ok(self.lookup(raw_key, LookupMode::Existence).await?.is_hit())
    }

    /// Writes `value` into every writable tier, fastest first.
    ///
    /// Stops at the first failing tier; faster tiers keep what was written.
    #[instrument(skip(self, raw_key, value), fields(node = %self.node_name, key_len = raw_key.len()))]
    pub async fn set(&self, raw_key: &str, value: &str) -> CacheResult<()> {
        self.ensure_open()?;
        let key = self.key(raw_key);

        for tier in self.tiers.iter().filter(|t| t.kind().accepts_writes()) {
            let kind = tier.kind();
            tier.populate(&key, value).await.inspect_err(|e| {
                self.stats.record_tier_error(kind);
                warn!(tier = %kind, error = %e, "Write failed");
            })?;
        }

        debug!("Stored value");
        Ok(())
    }

    /// Closes every tier. Later calls are no-ops returning `Ok`.
    ///
    /// Tiers close concurrently and all of them are closed even if one fails;
    /// the first failure (in tier order) is returned.
    pub async fn close(&self) -> CacheResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let results = join_all(self.tiers.iter().map(|tier| tier.close())).await;

        let mut first_error = None;
        for (tier, result) in self.tiers.iter().zip(results) {
            if let Err(e) = result {
                warn!(tier = %tier.kind(), error = %e, "Failed to close tier");
                first_error.get_or_insert(e);
            }
        }

        info!(node = %self.node_name, "Closed layered cache");
        first_error.map_or(Ok(()), Err)
    }

    async fn promote(&self, key: &CacheKey, value: &str, faster: &[Arc<dyn CacheTier>]) {
        for tier in faster.iter().filter(|t| t.kind().accepts_writes()) {
            match tier.populate(key, value).await {
                Ok(()) => self.stats.record_promotion(),
                Err(e) => {
                    self.stats.record_promotion_failure();
                    warn!(tier = %tier.kind(), error = %e, "Promotion failed");
                }
            }
        }
    }

    fn ensure_open(&self) -> CacheResult<()> {
        if self.is_closed() {
            Err(CacheError::Closed)
        } else {
            Ok(())
        }
    }
}

/// Handles to the in-memory tiers behind a mock cache.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct MockTiers {
    pub recency: RecencyCacheHandle,
    pub kv: MockKvBackend,
    pub filter: MockFilterBackend,
    pub store: MockAuthoritativeStore,
}

#[cfg(any(test, feature = "mock"))]
impl LayeredCache {
    /// Basic cache over in-memory tiers. `filter` and `store` in the returned
    /// handles are unused.
    pub fn new_mock_basic(config: &CacheConfig) -> CacheResult<(Self, MockTiers)> {
        config.validate()?;
        let mocks = MockTiers {
            recency: RecencyCacheHandle::with_capacity(config.lru_capacity)?,
            kv: MockKvBackend::new(),
            filter: MockFilterBackend::new(),
            store: MockAuthoritativeStore::new(),
        };

        let tiers: Vec<Arc<dyn CacheTier>> = vec![
            Arc::new(mocks.recency.clone()),
            Arc::new(SharedKvCache::with_ttl(
                mocks.kv.clone(),
                config.effective_ttl(),
            )),
        ];

        Ok((Self::new(&config.node_name, tiers)?, mocks))
    }

    /// Full cache over in-memory tiers.
    pub async fn new_mock_full(config: &CacheConfig) -> CacheResult<(Self, MockTiers)> {
        Self::new_mock_full_with(config, MockAuthoritativeStore::new()).await
    }

    /// Full cache over in-memory tiers, querying a pre-seeded `store`.
    pub async fn new_mock_full_with(
        config: &CacheConfig,
        store: MockAuthoritativeStore,
    ) -> CacheResult<(Self, MockTiers)> {
        config.validate_full()?;
        let mocks = MockTiers {
            recency: RecencyCacheHandle::with_capacity(config.lru_capacity)?,
            kv: MockKvBackend::new(),
            filter: MockFilterBackend::new(),
            store,
        };

        let filter = MembershipFilter::open(
            mocks.filter.clone(),
            &config.node_name,
            config.false_positive_rate,
            config.expected_elements,
        )
        .await?;

        let tiers: Vec<Arc<dyn CacheTier>> = vec![
            Arc::new(mocks.recency.clone()),
            Arc::new(SharedKvCache::with_ttl(
                mocks.kv.clone(),
                config.effective_ttl(),
            )),
            Arc::new(filter),
            Arc::new(AuthoritativeTier::new(
                mocks.store.clone(),
                &config.node_name,
            )?),
        ];

        Ok((Self::new(&config.node_name, tiers)?, mocks))
    }
}
