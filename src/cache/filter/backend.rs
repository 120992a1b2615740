use parking_lot::Mutex;
use redis::aio::ConnectionManager;
use redis::{ErrorKind, RedisResult};
use tracing::debug;

use crate::cache::error::{CacheError, CacheResult};
use crate::cache::shared::backend::connect_manager;
use crate::cache::types::TierKind;

/// Result of asking the service to create a named filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Created,
    /// Another instance created it first; treated as success.
    AlreadyExists,
}

/// Network probabilistic-set service behind the filter tier.
pub trait FilterBackend: Send + Sync {
    /// Returns `true` if a filter called `name` exists.
    fn exists_filter(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = CacheResult<bool>> + Send;

    /// Creates filter `name` sized for `capacity` items at `error_rate`.
    fn reserve(
        &self,
        name: &str,
        error_rate: f64,
        capacity: u64,
    ) -> impl std::future::Future<Output = CacheResult<ReserveOutcome>> + Send;

    /// Adds `item`. Returns `true` if it was newly added.
    fn add(
        &self,
        name: &str,
        item: &str,
    ) -> impl std::future::Future<Output = CacheResult<bool>> + Send;

    /// Returns `true` if `item` may have been added.
    fn exists(
        &self,
        name: &str,
        item: &str,
    ) -> impl std::future::Future<Output = CacheResult<bool>> + Send;

    /// Drops the connection. Idempotent.
    fn close(&self) -> impl std::future::Future<Output = CacheResult<()>> + Send;
}

/// RedisBloom-backed filter (`BF.*` commands).
pub struct RedisBloomBackend {
    url: String,
    conn: Mutex<Option<ConnectionManager>>,
}

impl RedisBloomBackend {
    /// Connects to `url` (e.g. `redis://localhost:6378`).
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let conn = connect_manager(url, TierKind::Filter).await?;
        debug!(url = url, "Connected filter tier");

        Ok(Self {
            url: url.to_string(),
            conn: Mutex::new(Some(conn)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn connection(&self) -> CacheResult<ConnectionManager> {
        self.conn.lock().clone().ok_or(CacheError::Closed)
    }
}

impl std::fmt::Debug for RedisBloomBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBloomBackend")
            .field("url", &self.url)
            .field("open", &self.conn.lock().is_some())
            .finish()
    }
}

fn unavailable(err: redis::RedisError) -> CacheError {
    CacheError::unavailable(TierKind::Filter, err)
}

impl FilterBackend for RedisBloomBackend {
    async fn exists_filter(&self, name: &str) -> CacheResult<bool> {
        let mut conn = self.connection()?;
        let info: RedisResult<redis::Value> =
            redis::cmd("BF.INFO").arg(name).query_async(&mut conn).await;

        match info {
            Ok(_) => Ok(true),
            // RedisBloom answers "ERR not found" for a missing filter.
            Err(e) if e.kind() == ErrorKind::ResponseError => Ok(false),
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn reserve(&self, name: &str, error_rate: f64, capacity: u64) -> CacheResult<ReserveOutcome> {
        let mut conn = self.connection()?;
        let reserved: RedisResult<()> = redis::cmd("BF.RESERVE")
            .arg(name)
            .arg(error_rate)
            .arg(capacity)
            .query_async(&mut conn)
            .await;

        match reserved {
            Ok(()) => Ok(ReserveOutcome::Created),
            Err(e) if e.kind() == ErrorKind::ResponseError && e.to_string().contains("exists") => {
                Ok(ReserveOutcome::AlreadyExists)
            }
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn add(&self, name: &str, item: &str) -> CacheResult<bool> {
        let mut conn = self.connection()?;
        redis::cmd("BF.ADD")
            .arg(name)
            .arg(item)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn exists(&self, name: &str, item: &str) -> CacheResult<bool> {
        let mut conn = self.connection()?;
        redis::cmd("BF.EXISTS")
            .arg(name)
            .arg(item)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn close(&self) -> CacheResult<()> {
        self.conn.lock().take();
        Ok(())
    }
}
