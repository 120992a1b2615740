//! Test fixtures for integration tests.

#![allow(dead_code)]

use layered::cache::{LayeredCache, MockTiers};
use layered::config::CacheConfig;
use layered::store::MockAuthoritativeStore;

pub const NODE: &str = "country";

pub const SMALL_CAPACITY: u64 = 2;

pub const FILTER_FALSE_POSITIVE_RATE: f64 = 0.001;

pub const FILTER_EXPECTED_ELEMENTS: u64 = 10_000;

/// `(value, uid)` pairs loaded into the authoritative store.
pub const COUNTRIES: &[(&str, &str)] = &[
    ("Italy", "u123"),
    ("France", "0x2a"),
    ("Spain", "0x2b"),
    ("Portugal", "0x2c"),
];

pub fn full_config(capacity: u64) -> CacheConfig {
    CacheConfig::full(NODE, capacity)
        .filter_params(FILTER_FALSE_POSITIVE_RATE, FILTER_EXPECTED_ELEMENTS)
}

pub fn seeded_store(records: &[(&str, &str)]) -> MockAuthoritativeStore {
    let store = MockAuthoritativeStore::new();
    for (value, uid) in records {
        store.insert(NODE, value, uid);
    }
    store
}

pub async fn full_cache(capacity: u64) -> (LayeredCache, MockTiers) {
    LayeredCache::new_mock_full_with(&full_config(capacity), seeded_store(COUNTRIES))
        .await
        .expect("mock cache should build")
}

/// Derived key as stored at every tier.
pub fn derived(raw: &str) -> String {
    format!("{NODE}-{raw}")
}
