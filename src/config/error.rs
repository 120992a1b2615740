//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating cache configuration.
///
/// These are only ever produced at construction time; no cache operation
/// returns a configuration error once the cache exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Node name is empty or not usable as a predicate/type name.
    #[error("invalid node name '{value}': must be non-empty and contain only [A-Za-z0-9_.]")]
    InvalidNodeName { value: String },

    /// LRU capacity must be positive.
    #[error("invalid LRU capacity {value}: must be greater than 0")]
    InvalidCapacity { value: u64 },

    /// False-positive rate must lie strictly between 0 and 1.
    #[error("invalid false-positive rate {value}: must be in (0, 1)")]
    InvalidFalsePositiveRate { value: f64 },

    /// Expected element count must be positive.
    #[error("invalid expected element count {value}: must be greater than 0")]
    InvalidExpectedElements { value: u64 },

    /// TTL was enabled with a zero duration.
    #[error("invalid TTL: must be at least one second when enabled")]
    InvalidTtl,

    /// Authoritative query timeout must be positive.
    #[error("invalid Dgraph timeout: must be greater than 0")]
    InvalidTimeout,

    /// No authoritative store endpoint was configured.
    #[error("at least one Dgraph endpoint is required")]
    NoDgraphEndpoints,

    /// A cache was assembled without any tiers.
    #[error("a layered cache needs at least one tier")]
    NoTiers,

    /// A numeric environment variable could not be parsed.
    #[error("failed to parse {name}='{value}' as a number")]
    InvalidNumber { name: &'static str, value: String },

    /// A boolean environment variable could not be parsed.
    #[error("failed to parse {name}='{value}' as a boolean")]
    InvalidBool { name: &'static str, value: String },

    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },
}
