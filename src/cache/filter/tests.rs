use super::*;
use crate::cache::error::CacheError;

async fn open_mock(backend: &MockFilterBackend) -> MembershipFilter<MockFilterBackend> {
    MembershipFilter::open(backend.clone(), "country", 0.001, 1_000)
        .await
        .expect("filter should open")
}

#[tokio::test]
async fn test_open_creates_missing_filter() {
    let backend = MockFilterBackend::new();
    let filter = open_mock(&backend).await;

    assert!(backend.has_filter("country"));
    assert_eq!(backend.reserve_count(), 1);
    assert_eq!(filter.name(), "country");
    assert_eq!(filter.false_positive_rate(), 0.001);
    assert_eq!(filter.expected_elements(), 1_000);
}

#[tokio::test]
async fn test_open_twice_is_idempotent_and_keeps_marks() {
    let backend = MockFilterBackend::new();
    let first = open_mock(&backend).await;
    first.mark("country-Italy").await.expect("mark");

    let second = MembershipFilter::open(backend.clone(), "country", 0.001, 1_000)
        .await
        .expect("second open must not fail");

    assert_eq!(backend.reserve_count(), 1);
    assert!(second.might_contain("country-Italy").await.expect("exists"));
}

#[tokio::test]
async fn test_lost_creation_race_is_success() {
    // The filter appears between the existence check and the reserve.
    let backend = LocalFilterBackend::new();
    assert_eq!(
        backend.reserve("country", 0.01, 100).await.unwrap(),
        ReserveOutcome::Created
    );
    assert_eq!(
        backend.reserve("country", 0.01, 100).await.unwrap(),
        ReserveOutcome::AlreadyExists
    );

    let filter = MembershipFilter::open(backend.clone(), "country", 0.01, 100).await;
    assert!(filter.is_ok());
    assert_eq!(backend.filter_count(), 1);
}

#[tokio::test]
async fn test_existing_filter_keeps_original_sizing() {
    let backend = LocalFilterBackend::new();
    MembershipFilter::open(backend.clone(), "age", 0.01, 100)
        .await
        .expect("open");
    let original = backend.sizing("age").expect("filter exists");

    MembershipFilter::open(backend.clone(), "age", 0.000_001, 1_000_000)
        .await
        .expect("reopen");

    assert_eq!(backend.sizing("age"), Some(original));
}

#[tokio::test]
async fn test_open_rejects_invalid_parameters() {
    let backend = MockFilterBackend::new();

    let err = MembershipFilter::open(backend.clone(), "country", 1.0, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::Config(_)));

    let err = MembershipFilter::open(backend.clone(), "country", 0.01, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, CacheError::Config(_)));

    assert!(!backend.has_filter("country"));
}

#[tokio::test]
async fn test_unmarked_key_is_absent() {
    let backend = MockFilterBackend::new();
    let filter = open_mock(&backend).await;

    assert!(!filter.might_contain("country-Italy").await.expect("exists"));
}

#[tokio::test]
async fn test_marked_keys_are_never_false_negatives() {
    let backend = MockFilterBackend::new();
    let filter = open_mock(&backend).await;

    for i in 0..500 {
        filter.mark(&format!("country-{i}")).await.expect("mark");
    }

    for i in 0..500 {
        assert!(
            filter
                .might_contain(&format!("country-{i}"))
                .await
                .expect("exists")
        );
    }
}

#[tokio::test]
async fn test_tier_answers_maybe_present_never_hit() {
    let backend = MockFilterBackend::new();
    let filter = open_mock(&backend).await;
    let key = CacheKey::new("country", "Italy");

    assert_eq!(CacheTier::get(&filter, &key).await.unwrap(), TierResult::Miss);

    filter.populate(&key, "u123").await.expect("populate");

    assert!(backend.is_marked("country", "country-Italy"));
    assert_eq!(
        CacheTier::get(&filter, &key).await.unwrap(),
        TierResult::MaybePresent
    );
    assert_eq!(
        CacheTier::contains(&filter, &key).await.unwrap(),
        TierResult::MaybePresent
    );
    assert_eq!(filter.kind(), TierKind::Filter);
}

#[tokio::test]
async fn test_unavailable_filter_propagates() {
    let backend = MockFilterBackend::new();
    let filter = open_mock(&backend).await;
    backend.set_unavailable(true);

    let err = filter.might_contain("country-Italy").await.unwrap_err();
    assert!(matches!(
        err,
        CacheError::TierUnavailable {
            tier: TierKind::Filter,
            ..
        }
    ));

    let err = MembershipFilter::open(backend.clone(), "age", 0.01, 10)
        .await
        .unwrap_err();
    assert!(err.is_tier_unavailable());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let backend = MockFilterBackend::new();
    let filter = open_mock(&backend).await;

    filter.close().await.expect("first close");
    filter.close().await.expect("second close");
    assert!(backend.is_closed());
}
