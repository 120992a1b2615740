//! Filter backend with failure injection and call counters.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::backend::{FilterBackend, ReserveOutcome};
use super::local::LocalFilterBackend;
use crate::cache::error::{CacheError, CacheResult};
use crate::cache::types::TierKind;

#[derive(Debug, Default)]
struct MockFilterState {
    unavailable: AtomicBool,
    closed: AtomicBool,
    reserves: AtomicUsize,
    adds: AtomicUsize,
    exists_calls: AtomicUsize,
}

#[derive(Debug, Default, Clone)]
pub struct MockFilterBackend {
    inner: LocalFilterBackend,
    state: Arc<MockFilterState>,
}

impl MockFilterBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether `item` is marked in `name`, without counting a call.
    pub fn is_marked(&self, name: &str, item: &str) -> bool {
        self.inner.exists_sync(name, item)
    }

    /// Creates `name` and marks `items` directly, bypassing counters.
    pub fn seed(&self, name: &str, error_rate: f64, capacity: u64, items: &[&str]) {
        self.inner.reserve_sync(name, error_rate, capacity);
        for item in items {
            // The filter was just reserved, so marking cannot fail.
            let _ = self.inner.add_sync(name, item);
        }
    }

    pub fn has_filter(&self, name: &str) -> bool {
        self.inner.exists_filter_sync(name)
    }

    pub fn local(&self) -> &LocalFilterBackend {
        &self.inner
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn reserve_count(&self) -> usize {
        self.state.reserves.load(Ordering::SeqCst)
    }

    pub fn add_count(&self) -> usize {
        self.state.adds.load(Ordering::SeqCst)
    }

    pub fn exists_count(&self) -> usize {
        self.state.exists_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    fn check(&self) -> CacheResult<()> {
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(CacheError::Closed);
        }
        if self.state.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::unavailable(
                TierKind::Filter,
                "connection refused (mock)",
            ));
        }
        Ok(())
    }
}

impl FilterBackend for MockFilterBackend {
    async fn exists_filter(&self, name: &str) -> CacheResult<bool> {
        self.check()?;
        Ok(self.inner.exists_filter_sync(name))
    }

    async fn reserve(&self, name: &str, error_rate: f64, capacity: u64) -> CacheResult<ReserveOutcome> {
        self.check()?;
        self.state.reserves.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.reserve_sync(name, error_rate, capacity))
    }

    async fn add(&self, name: &str, item: &str) -> CacheResult<bool> {
        self.check()?;
        self.state.adds.fetch_add(1, Ordering::SeqCst);
        self.inner.add_sync(name, item)
    }

    async fn exists(&self, name: &str, item: &str) -> CacheResult<bool> {
        self.check()?;
        self.state.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.exists_sync(name, item))
    }

    async fn close(&self) -> CacheResult<()> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
