//! Cache configuration.
//!
//! Presets exist for the two standard assemblies ([`CacheConfig::basic`] and
//! [`CacheConfig::full`]). Override any field with `LAYERED_*` environment
//! variables via [`CacheConfig::from_env`].

pub mod error;


pub use error::ConfigError;

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BLOOM_URL, DEFAULT_DGRAPH_TIMEOUT, DEFAULT_DGRAPH_URL, DEFAULT_EXPECTED_ELEMENTS,
    DEFAULT_FALSE_POSITIVE_RATE, DEFAULT_LRU_CAPACITY, DEFAULT_REDIS_URL, DEFAULT_TTL,
};

/// Construction-time options for a layered cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Record type served by this cache. Used as the key namespace, the filter
    /// name, and the predicate queried in the authoritative store.
    pub node_name: String,

    /// Max entries in the in-process recency tier. Default: `10_000`.
    pub lru_capacity: u64,

    /// Target false-positive probability of the membership filter. Default: `1e-6`.
    pub false_positive_rate: f64,

    /// Expected number of elements in the membership filter. Default: `1_000_000`.
    pub expected_elements: u64,

    /// Whether shared-tier writes expire.
    pub ttl_enabled: bool,

    /// Expiry used when `ttl_enabled` is set. Default: 300 seconds.
    pub ttl: Duration,

    /// Shared key-value tier endpoint. Default: `redis://localhost:6379`.
    pub redis_url: String,

    /// Membership filter endpoint. Default: `redis://localhost:6378`.
    pub bloom_url: String,

    /// Dgraph Alpha HTTP endpoints, used round-robin.
    pub dgraph_urls: Vec<String>,

    /// HTTP timeout for authoritative queries.
    pub dgraph_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            node_name: String::new(),
            lru_capacity: DEFAULT_LRU_CAPACITY,
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
            expected_elements: DEFAULT_EXPECTED_ELEMENTS,
            ttl_enabled: false,
            ttl: DEFAULT_TTL,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            bloom_url: DEFAULT_BLOOM_URL.to_string(),
            dgraph_urls: vec![DEFAULT_DGRAPH_URL.to_string()],
            dgraph_timeout: DEFAULT_DGRAPH_TIMEOUT,
        }
    }
}

impl CacheConfig {
    const ENV_NODE_NAME: &'static str = "LAYERED_NODE_NAME";
    const ENV_LRU_CAPACITY: &'static str = "LAYERED_LRU_CAPACITY";
    const ENV_FALSE_POSITIVE_RATE: &'static str = "LAYERED_FALSE_POSITIVE_RATE";
    const ENV_EXPECTED_ELEMENTS: &'static str = "LAYERED_EXPECTED_ELEMENTS";
    const ENV_TTL_ENABLED: &'static str = "LAYERED_TTL_ENABLED";
    const ENV_TTL_SECS: &'static str = "LAYERED_TTL_SECS";
    const ENV_REDIS_URL: &'static str = "LAYERED_REDIS_URL";
    const ENV_BLOOM_URL: &'static str = "LAYERED_BLOOM_URL";
    const ENV_DGRAPH_URLS: &'static str = "LAYERED_DGRAPH_URLS";
    const ENV_DGRAPH_TIMEOUT_MS: &'static str = "LAYERED_DGRAPH_TIMEOUT_MS";

    /// Preset for the two-tier cache (recency + shared). TTL is off.
    pub fn basic(node_name: &str, lru_capacity: u64) -> Self {
        Self {
            node_name: node_name.to_string(),
            lru_capacity,
            ..Default::default()
        }
    }

    /// Preset for the four-tier cache. Shared-tier writes expire after 300 seconds.
    pub fn full(node_name: &str, lru_capacity: u64) -> Self {
        Self {
            node_name: node_name.to_string(),
            lru_capacity,
            ttl_enabled: true,
            ..Default::default()
        }
    }

    pub fn filter_params(mut self, false_positive_rate: f64, expected_elements: u64) -> Self {
        self.false_positive_rate = false_positive_rate;
        self.expected_elements = expected_elements;
        self
    }

    pub fn ttl_enabled(mut self, enabled: bool) -> Self {
        self.ttl_enabled = enabled;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn redis_url(mut self, url: &str) -> Self {
        self.redis_url = url.to_string();
        self
    }

    pub fn bloom_url(mut self, url: &str) -> Self {
        self.bloom_url = url.to_string();
        self
    }

    pub fn dgraph_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dgraph_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// TTL to apply to shared-tier writes, if any.
    pub fn effective_ttl(&self) -> Option<Duration> {
        self.ttl_enabled.then_some(self.ttl)
    }

    /// Loads configuration from environment variables on top of the full preset.
    ///
    /// `LAYERED_NODE_NAME` is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let node_name = env::var(Self::ENV_NODE_NAME)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_NODE_NAME,
            })?;

        let defaults = Self::full(&node_name, DEFAULT_LRU_CAPACITY);

        let lru_capacity = Self::parse_u64_from_env(Self::ENV_LRU_CAPACITY, defaults.lru_capacity)?;
        let false_positive_rate =
            Self::parse_f64_from_env(Self::ENV_FALSE_POSITIVE_RATE, defaults.false_positive_rate)?;
        let expected_elements =
            Self::parse_u64_from_env(Self::ENV_EXPECTED_ELEMENTS, defaults.expected_elements)?;
        let ttl_enabled = Self::parse_bool_from_env(Self::ENV_TTL_ENABLED, defaults.ttl_enabled)?;
        let ttl = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_TTL_SECS,
            defaults.ttl.as_secs(),
        )?);
        let redis_url = Self::parse_string_from_env(Self::ENV_REDIS_URL, defaults.redis_url);
        let bloom_url = Self::parse_string_from_env(Self::ENV_BLOOM_URL, defaults.bloom_url);
        let dgraph_urls = Self::parse_list_from_env(Self::ENV_DGRAPH_URLS, defaults.dgraph_urls);
        let dgraph_timeout = Duration::from_millis(Self::parse_u64_from_env(
            Self::ENV_DGRAPH_TIMEOUT_MS,
            defaults.dgraph_timeout.as_millis() as u64,
        )?);

        Ok(Self {
            node_name,
            lru_capacity,
            false_positive_rate,
            expected_elements,
            ttl_enabled,
            ttl,
            redis_url,
            bloom_url,
            dgraph_urls,
            dgraph_timeout,
        })
    }

    /// Validates the options used by every assembly (node name, capacity, TTL).
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_node_name(&self.node_name)?;

        if self.lru_capacity == 0 {
            return Err(ConfigError::InvalidCapacity {
                value: self.lru_capacity,
            });
        }

        if self.ttl_enabled && self.ttl.as_secs() == 0 {
            return Err(ConfigError::InvalidTtl);
        }

        Ok(())
    }

    /// Validates everything [`validate`](Self::validate) does plus the filter
    /// and authoritative-store options.
    pub fn validate_full(&self) -> Result<(), ConfigError> {
        self.validate()?;

        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(ConfigError::InvalidFalsePositiveRate {
                value: self.false_positive_rate,
            });
        }

        if self.expected_elements == 0 {
            return Err(ConfigError::InvalidExpectedElements {
                value: self.expected_elements,
            });
        }

        if self.dgraph_urls.is_empty() {
            return Err(ConfigError::NoDgraphEndpoints);
        }

        if self.dgraph_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }

    fn parse_u64_from_env(name: &'static str, default: u64) -> Result<u64, ConfigError> {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_f64_from_env(name: &'static str, default: f64) -> Result<f64, ConfigError> {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidBool { name, value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(name: &str, default: String) -> String {
        env::var(name).unwrap_or(default)
    }

    fn parse_list_from_env(name: &str, default: Vec<String>) -> Vec<String> {
        match env::var(name) {
            Ok(value) => value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => default,
        }
    }
}

/// Checks that `name` can be spliced into a DQL query as a predicate or type.
pub fn validate_node_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidNodeName {
            value: name.to_string(),
        })
    }
}
