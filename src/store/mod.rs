//! Authoritative graph store adapter (Tier 4).
//!
//! The store is read-only from the cache's point of view: it answers
//! "does any record have `field == value`" and returns the record's uid.

pub mod dgraph;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod query;

#[cfg(test)]
mod tests;

pub use dgraph::DgraphStore;
pub use error::{StoreError, StoreResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockAuthoritativeStore;
pub use query::{QueryRequest, parse_lookup_response, validate_identifier};

/// Source of truth queried when every cache tier misses.
pub trait AuthoritativeStore: Send + Sync {
    /// Finds a record of type `namespace` whose `field` equals `value`.
    ///
    /// `Ok(None)` means no such record; query or transport failures are errors.
    fn lookup_by_field(
        &self,
        namespace: &str,
        field: &str,
        value: &str,
    ) -> impl std::future::Future<Output = StoreResult<Option<String>>> + Send;

    /// Releases connections. Idempotent.
    fn close(&self) -> impl std::future::Future<Output = StoreResult<()>> + Send;
}
