use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by the authoritative store adapter.
///
/// None of these mean "not found": absence is `Ok(None)`.
pub enum StoreError {
    /// The request never produced a response.
    #[error("request to '{endpoint}' failed: {message}")]
    Transport {
        /// Endpoint URL.
        endpoint: String,
        /// Error message.
        message: String,
    },

    /// The server answered with a non-success HTTP status.
    #[error("'{endpoint}' returned HTTP {status}: {body}")]
    Status {
        /// Endpoint URL.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// The server rejected or failed the query.
    #[error("query failed: {message}")]
    Query {
        /// Server-reported messages, joined.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode {
        /// Error message.
        message: String,
    },

    /// A predicate or type name cannot be placed in a query.
    #[error("invalid identifier '{name}': only [A-Za-z0-9_.] allowed")]
    InvalidIdentifier {
        /// Offending name.
        name: String,
    },

    /// The adapter was closed.
    #[error("store connection is closed")]
    Closed,
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
