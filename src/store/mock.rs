//! In-memory authoritative store for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::AuthoritativeStore;
use super::error::{StoreError, StoreResult};
use super::query::validate_identifier;

#[derive(Debug, Default)]
struct MockStoreState {
    // (field, value) -> uid
    records: RwLock<HashMap<(String, String), String>>,
    queries: AtomicUsize,
    failing: AtomicBool,
    closed: AtomicBool,
}

/// Records keyed by `(field, value)` with a query counter and failure toggle.
#[derive(Debug, Default, Clone)]
pub struct MockAuthoritativeStore {
    state: Arc<MockStoreState>,
}

impl MockAuthoritativeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record whose `field` equals `value`.
    pub fn insert(&self, field: &str, value: &str, uid: &str) {
        self.state
            .records
            .write()
            .insert((field.to_string(), value.to_string()), uid.to_string());
    }

    pub fn remove(&self, field: &str, value: &str) -> Option<String> {
        self.state
            .records
            .write()
            .remove(&(field.to_string(), value.to_string()))
    }

    /// Number of lookups served (including failed ones).
    pub fn query_count(&self) -> usize {
        self.state.queries.load(Ordering::SeqCst)
    }

    /// Makes every subsequent lookup fail with a query error.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

impl AuthoritativeStore for MockAuthoritativeStore {
    async fn lookup_by_field(
        &self,
        namespace: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Option<String>> {
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        validate_identifier(namespace)?;
        validate_identifier(field)?;

        self.state.queries.fetch_add(1, Ordering::SeqCst);

        if self.state.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Query {
                message: "predicate not indexed (mock)".to_string(),
            });
        }

        Ok(self
            .state
            .records
            .read()
            .get(&(field.to_string(), value.to_string()))
            .cloned())
    }

    async fn close(&self) -> StoreResult<()> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
