use thiserror::Error;

use super::types::TierKind;
use crate::config::ConfigError;
use crate::store::StoreError;

#[derive(Debug, Error)]
/// Errors returned by cache tiers and the layered cache.
///
/// A miss is never an error: it is `Ok(None)`, `Ok(false)` or
/// [`LayeredLookupResult::Miss`](super::LayeredLookupResult::Miss).
pub enum CacheError {
    /// A networked tier (shared store or filter) could not be reached or failed.
    #[error("{tier} tier unavailable: {message}")]
    TierUnavailable {
        /// Tier that failed.
        tier: TierKind,
        /// Error message.
        message: String,
    },

    /// The authoritative store query failed.
    #[error("authoritative store query failed: {0}")]
    AuthoritativeQuery(#[from] StoreError),

    /// Invalid construction parameters.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cache (or tier) was closed.
    #[error("cache is closed")]
    Closed,
}

impl CacheError {
    pub fn unavailable(tier: TierKind, err: impl std::fmt::Display) -> Self {
        CacheError::TierUnavailable {
            tier,
            message: err.to_string(),
        }
    }

    /// Whether the failing tier could be skipped by a caller willing to degrade.
    pub fn is_tier_unavailable(&self) -> bool {
        matches!(self, CacheError::TierUnavailable { .. })
    }
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
