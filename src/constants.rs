//! Cross-cutting, shared constants.
//!
//! Tier endpoints default to a single-host deployment: Redis on its stock port,
//! RedisBloom on a neighbouring port, and a Dgraph Alpha serving HTTP.

use std::time::Duration;

/// Separator between the namespace and the caller's raw key.
pub const KEY_SEPARATOR: char = '-';

pub const DEFAULT_LRU_CAPACITY: u64 = 10_000;

/// Expiry applied to shared-tier writes when TTL is enabled.
pub const DEFAULT_TTL_SECS: u64 = 300;
pub const DEFAULT_TTL: Duration = Duration::from_secs(DEFAULT_TTL_SECS);

pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 1.0e-6;
pub const DEFAULT_EXPECTED_ELEMENTS: u64 = 1_000_000;

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_BLOOM_URL: &str = "redis://localhost:6378";
pub const DEFAULT_DGRAPH_URL: &str = "http://localhost:8080";

pub const DEFAULT_DGRAPH_TIMEOUT: Duration = Duration::from_secs(30);
