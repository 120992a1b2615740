//! Tier 3: shared, append-only membership filter.
//!
//! The filter records presence only. A positive answer means "possibly
//! present, value unknown" and may short-circuit an existence check; it is
//! never used to answer a value lookup or to populate faster tiers. A negative
//! answer only covers marked keys, so it does not stop the cascade either.

pub mod backend;
pub mod bloom;
pub mod local;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use tracing::{debug, info};

pub use backend::{FilterBackend, RedisBloomBackend, ReserveOutcome};
pub use bloom::BloomBits;
pub use local::LocalFilterBackend;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockFilterBackend;

use super::error::CacheResult;
use super::key::CacheKey;
use super::tier::CacheTier;
use super::types::{TierKind, TierResult};
use crate::config::ConfigError;

/// Named filter on a [`FilterBackend`].
pub struct MembershipFilter<B: FilterBackend> {
    backend: B,
    name: String,
    false_positive_rate: f64,
    expected_elements: u64,
}

impl<B: FilterBackend> MembershipFilter<B> {
    /// Opens filter `name`, creating it with `false_positive_rate` and
    /// `expected_elements` if it does not exist yet.
    ///
    /// An existing filter is reused as-is (its markings are kept and its
    /// original sizing wins). Losing a creation race is not an error.
    pub async fn open(
        backend: B,
        name: &str,
        false_positive_rate: f64,
        expected_elements: u64,
    ) -> CacheResult<Self> {
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(ConfigError::InvalidFalsePositiveRate {
                value: false_positive_rate,
            }
            .into());
        }
        if expected_elements == 0 {
            return Err(ConfigError::InvalidExpectedElements {
                value: expected_elements,
            }
            .into());
        }

        if backend.exists_filter(name).await? {
            debug!(filter = name, "Reusing existing membership filter");
        } else {
            match backend
                .reserve(name, false_positive_rate, expected_elements)
                .await?
            {
                ReserveOutcome::Created => info!(
                    filter = name,
                    false_positive_rate, expected_elements, "Created membership filter"
                ),
                ReserveOutcome::AlreadyExists => {
                    debug!(filter = name, "Membership filter created concurrently")
                }
            }
        }

        Ok(Self {
            backend,
            name: name.to_string(),
            false_positive_rate,
            expected_elements,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }

    pub fn expected_elements(&self) -> u64 {
        self.expected_elements
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Marks `key` as present. Marks are never removed.
    pub async fn mark(&self, key: &str) -> CacheResult<()> {
        self.backend.add(&self.name, key).await?;
        Ok(())
    }

    /// `false` guarantees `key` was never marked; `true` may be a false positive.
    pub async fn might_contain(&self, key: &str) -> CacheResult<bool> {
        self.backend.exists(&self.name, key).await
    }
}

impl<B: FilterBackend> std::fmt::Debug for MembershipFilter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipFilter")
            .field("name", &self.name)
            .field("false_positive_rate", &self.false_positive_rate)
            .field("expected_elements", &self.expected_elements)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<B: FilterBackend> CacheTier for MembershipFilter<B> {
    fn kind(&self) -> TierKind {
        TierKind::Filter
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<TierResult> {
        if self.might_contain(key.derived()).await? {
            Ok(TierResult::MaybePresent)
        } else {
            Ok(TierResult::Miss)
        }
    }

    async fn populate(&self, key: &CacheKey, _value: &str) -> CacheResult<()> {
        self.mark(key.derived()).await
    }

    async fn close(&self) -> CacheResult<()> {
        self.backend.close().await
    }
}
