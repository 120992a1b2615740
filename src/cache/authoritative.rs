//! Tier 4: read-only view of the authoritative store.

use async_trait::async_trait;
use tracing::debug;

use super::error::{CacheError, CacheResult};
use super::key::CacheKey;
use super::tier::CacheTier;
use super::types::{TierKind, TierResult};
use crate::config::{ConfigError, validate_node_name};
use crate::store::{AuthoritativeStore, StoreError};

/// Answers lookups by querying `field == raw key` in the store.
///
/// A hit yields the matching record's uid. Populating is a no-op: the cache
/// never writes to the source of truth.
pub struct AuthoritativeTier<S: AuthoritativeStore> {
    store: S,
    field: String,
}

impl<S: AuthoritativeStore> AuthoritativeTier<S> {
    /// Queries `field` for every lookup. `field` must be a plain identifier.
    pub fn new(store: S, field: &str) -> Result<Self, ConfigError> {
        validate_node_name(field)?;
        Ok(Self {
            store,
            field: field.to_string(),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl<S: AuthoritativeStore> std::fmt::Debug for AuthoritativeTier<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthoritativeTier")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<S: AuthoritativeStore> CacheTier for AuthoritativeTier<S> {
    fn kind(&self) -> TierKind {
        TierKind::Authoritative
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<TierResult> {
        match self
            .store
            .lookup_by_field(key.namespace(), &self.field, key.raw())
            .await
        {
            Ok(uid) => {
                debug!(field = %self.field, found = uid.is_some(), "Queried authoritative store");
                Ok(TierResult::from_option(uid))
            }
            Err(StoreError::Closed) => Err(CacheError::Closed),
            Err(e) => Err(CacheError::AuthoritativeQuery(e)),
        }
    }

    async fn populate(&self, _key: &CacheKey, _value: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn close(&self) -> CacheResult<()> {
        self.store.close().await.map_err(CacheError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockAuthoritativeStore;

    #[tokio::test]
    async fn test_hit_returns_uid() {
        let store = MockAuthoritativeStore::new();
        store.insert("country", "Italy", "u123");
        let tier = AuthoritativeTier::new(store, "country").unwrap();

        let result = tier.get(&CacheKey::new("country", "Italy")).await.unwrap();
        assert_eq!(result, TierResult::Hit("u123".to_string()));

        let result = tier.get(&CacheKey::new("country", "France")).await.unwrap();
        assert_eq!(result, TierResult::Miss);
    }

    #[tokio::test]
    async fn test_populate_never_writes() {
        let store = MockAuthoritativeStore::new();
        let tier = AuthoritativeTier::new(store.clone(), "country").unwrap();
        let key = CacheKey::new("country", "Spain");

        tier.populate(&key, "u9").await.unwrap();

        assert_eq!(tier.get(&key).await.unwrap(), TierResult::Miss);
        assert!(!tier.kind().accepts_writes());
    }

    #[tokio::test]
    async fn test_query_failure_is_not_a_miss() {
        let store = MockAuthoritativeStore::new();
        store.set_failing(true);
        let tier = AuthoritativeTier::new(store, "country").unwrap();

        let err = tier
            .get(&CacheKey::new("country", "Italy"))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::AuthoritativeQuery(_)));
    }

    #[tokio::test]
    async fn test_rejects_bad_field() {
        let err = AuthoritativeTier::new(MockAuthoritativeStore::new(), "bad field").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNodeName { .. }));
    }

    #[tokio::test]
    async fn test_closed_store() {
        let store = MockAuthoritativeStore::new();
        let tier = AuthoritativeTier::new(store.clone(), "country").unwrap();

        tier.close().await.unwrap();
        tier.close().await.unwrap();
        assert!(store.is_closed());

        let err = tier
            .get(&CacheKey::new("country", "Italy"))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Closed));
    }
}
