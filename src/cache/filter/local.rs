//! In-process filter service: a registry of named [`BloomBits`].
//!
//! Behaves like the networked service (named filters, idempotent reserve,
//! "may contain" answers) for single-host deployments and tests. Clones share
//! the same registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::backend::{FilterBackend, ReserveOutcome};
use super::bloom::BloomBits;
use crate::cache::error::{CacheError, CacheResult};
use crate::cache::types::TierKind;

#[derive(Debug, Default, Clone)]
pub struct LocalFilterBackend {
    filters: Arc<RwLock<HashMap<String, BloomBits>>>,
}

impl LocalFilterBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of named filters.
    pub fn filter_count(&self) -> usize {
        self.filters.read().len()
    }

    /// Bit/hash sizing of filter `name`, if it exists.
    pub fn sizing(&self, name: &str) -> Option<(usize, u32)> {
        self.filters
            .read()
            .get(name)
            .map(|f| (f.num_bits(), f.num_hashes()))
    }

    pub(crate) fn reserve_sync(&self, name: &str, error_rate: f64, capacity: u64) -> ReserveOutcome {
        let mut filters = self.filters.write();
        if filters.contains_key(name) {
            return ReserveOutcome::AlreadyExists;
        }
        filters.insert(name.to_string(), BloomBits::new(capacity, error_rate));
        ReserveOutcome::Created
    }

    pub(crate) fn add_sync(&self, name: &str, item: &str) -> CacheResult<bool> {
        let mut filters = self.filters.write();
        let filter = filters.get_mut(name).ok_or_else(|| {
            CacheError::unavailable(TierKind::Filter, format!("filter '{name}' not found"))
        })?;
        Ok(filter.insert(item.as_bytes()))
    }

    pub(crate) fn exists_sync(&self, name: &str, item: &str) -> bool {
        self.filters
            .read()
            .get(name)
            .is_some_and(|f| f.contains(item.as_bytes()))
    }

    pub(crate) fn exists_filter_sync(&self, name: &str) -> bool {
        self.filters.read().contains_key(name)
    }
}

impl FilterBackend for LocalFilterBackend {
    async fn exists_filter(&self, name: &str) -> CacheResult<bool> {
        Ok(self.exists_filter_sync(name))
    }

    async fn reserve(&self, name: &str, error_rate: f64, capacity: u64) -> CacheResult<ReserveOutcome> {
        Ok(self.reserve_sync(name, error_rate, capacity))
    }

    async fn add(&self, name: &str, item: &str) -> CacheResult<bool> {
        self.add_sync(name, item)
    }

    async fn exists(&self, name: &str, item: &str) -> CacheResult<bool> {
        Ok(self.exists_sync(name, item))
    }

    async fn close(&self) -> CacheResult<()> {
        Ok(())
    }
}
