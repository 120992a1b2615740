use std::time::Duration;

use super::*;
use crate::cache::error::CacheError;

#[tokio::test]
async fn test_set_then_get() {
    let tier = SharedKvCache::new(MockKvBackend::new());

    tier.set("country-Italy", "0x2a", false)
        .await
        .expect("set should succeed");

    assert_eq!(
        tier.get("country-Italy").await.expect("get"),
        Some("0x2a".to_string())
    );
    assert_eq!(tier.backend().ttl_of("country-Italy"), None);
}

#[tokio::test]
async fn test_get_miss_is_not_an_error() {
    let tier = SharedKvCache::new(MockKvBackend::new());

    assert_eq!(tier.get("country-Atlantis").await.expect("get"), None);
}

#[tokio::test]
async fn test_ttl_enabled_write_records_expiry() {
    let tier = SharedKvCache::with_ttl(MockKvBackend::new(), Some(Duration::from_secs(300)));

    tier.set("age-42", "0x9", true).await.expect("set");

    assert_eq!(
        tier.backend().ttl_of("age-42"),
        Some(Duration::from_secs(300))
    );
}

#[tokio::test]
async fn test_ttl_entries_expire() {
    let tier = SharedKvCache::with_ttl(MockKvBackend::new(), Some(Duration::from_millis(50)));

    tier.set("age-42", "0x9", true).await.expect("set");
    assert!(tier.get("age-42").await.expect("get").is_some());

    tokio::time::sleep(Duration::from_millis(80)).await;

    assert!(tier.get("age-42").await.expect("get").is_none());
}

#[tokio::test]
async fn test_populate_follows_configured_ttl() {
    let key = CacheKey::new("country", "Italy");

    let durable = SharedKvCache::new(MockKvBackend::new());
    durable.populate(&key, "u1").await.expect("populate");
    assert_eq!(durable.ttl(), None);
    assert_eq!(durable.backend().ttl_of("country-Italy"), None);

    let expiring = SharedKvCache::with_ttl(MockKvBackend::new(), Some(Duration::from_secs(300)));
    expiring.populate(&key, "u1").await.expect("populate");
    assert_eq!(expiring.ttl(), Some(Duration::from_secs(300)));
    assert_eq!(
        expiring.backend().ttl_of("country-Italy"),
        Some(Duration::from_secs(300))
    );
}

#[tokio::test]
async fn test_tier_reads_derived_key() {
    let backend = MockKvBackend::new();
    backend.insert("country-France", "0x3");
    let tier = SharedKvCache::new(backend);

    let result = CacheTier::get(&tier, &CacheKey::new("country", "France"))
        .await
        .expect("get");

    assert_eq!(result, TierResult::Hit("0x3".to_string()));
    assert_eq!(tier.kind(), TierKind::Shared);
}

#[tokio::test]
async fn test_unavailable_is_distinct_from_miss() {
    let backend = MockKvBackend::new();
    let tier = SharedKvCache::new(backend.clone());
    backend.set_unavailable(true);

    let err = tier.get("country-Italy").await.unwrap_err();
    assert!(matches!(
        err,
        CacheError::TierUnavailable {
            tier: TierKind::Shared,
            ..
        }
    ));
    assert!(err.is_tier_unavailable());

    let err = tier.set("country-Italy", "x", false).await.unwrap_err();
    assert!(err.is_tier_unavailable());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let backend = MockKvBackend::new();
    let tier = SharedKvCache::new(backend.clone());

    tier.close().await.expect("first close");
    tier.close().await.expect("second close");

    assert!(backend.is_closed());
    assert!(matches!(
        tier.get("country-Italy").await,
        Err(CacheError::Closed)
    ));
}
