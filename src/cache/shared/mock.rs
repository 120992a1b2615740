//! In-memory stand-in for the shared key/value service.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::backend::KvBackend;
use crate::cache::error::{CacheError, CacheResult};
use crate::cache::types::{CacheValue, TierKind};

#[derive(Debug, Clone)]
struct MockEntry {
    value: CacheValue,
    ttl: Option<Duration>,
    expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct MockKvState {
    entries: RwLock<HashMap<String, MockEntry>>,
    unavailable: AtomicBool,
    closed: AtomicBool,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

/// Cloneable mock; clones share state, so a test can keep one to inspect
/// what the cache wrote.
#[derive(Debug, Default, Clone)]
pub struct MockKvBackend {
    state: Arc<MockKvState>,
}

impl MockKvBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `key` directly, bypassing counters.
    pub fn insert(&self, key: &str, value: &str) {
        self.state.entries.write().insert(
            key.to_string(),
            MockEntry {
                value: value.to_string(),
                ttl: None,
                expires_at: None,
            },
        );
    }

    /// Reads `key` without counting it as a tier access.
    pub fn peek(&self, key: &str) -> Option<CacheValue> {
        self.state
            .entries
            .read()
            .get(key)
            .filter(|e| !is_expired(e))
            .map(|e| e.value.clone())
    }

    /// TTL of the most recent write to `key`.
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.state.entries.read().get(key).and_then(|e| e.ttl)
    }

    /// Makes every subsequent call fail as if the service were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn get_count(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    pub fn set_count(&self) -> usize {
        self.state.sets.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.state.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.entries.read().is_empty()
    }

    fn check(&self) -> CacheResult<()> {
        if self.state.closed.load(Ordering::SeqCst) {
            return Err(CacheError::Closed);
        }
        if self.state.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::unavailable(
                TierKind::Shared,
                "connection refused (mock)",
            ));
        }
        Ok(())
    }
}

fn is_expired(entry: &MockEntry) -> bool {
    entry
        .expires_at
        .is_some_and(|deadline| Instant::now() >= deadline)
}

impl KvBackend for MockKvBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheValue>> {
        self.check()?;
        self.state.gets.fetch_add(1, Ordering::SeqCst);

        let mut entries = self.state.entries.write();
        match entries.get(key) {
            Some(entry) if is_expired(entry) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        self.check()?;
        self.state.sets.fetch_add(1, Ordering::SeqCst);

        self.state.entries.write().insert(
            key.to_string(),
            MockEntry {
                value: value.to_string(),
                ttl,
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn close(&self) -> CacheResult<()> {
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
