use std::time::Duration;

use parking_lot::Mutex;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::cache::error::{CacheError, CacheResult};
use crate::cache::types::{CacheValue, TierKind};

/// Network key/value service behind the shared tier.
pub trait KvBackend: Send + Sync {
    /// Reads `key`. `Ok(None)` means absent; transport failures are errors.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = CacheResult<Option<CacheValue>>> + Send;

    /// Writes `key`, expiring after `ttl` when given.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;

    /// Drops the connection. Idempotent.
    fn close(&self) -> impl std::future::Future<Output = CacheResult<()>> + Send;
}

/// Redis-backed shared tier.
pub struct RedisKvBackend {
    url: String,
    conn: Mutex<Option<ConnectionManager>>,
}

impl RedisKvBackend {
    /// Connects to `url` (e.g. `redis://localhost:6379`).
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let conn = connect_manager(url, TierKind::Shared).await?;
        debug!(url = url, "Connected shared tier");

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

impl std::fmt::Debug for RedisKvBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKvBackend")
            .field("url", &self.url)
            .field("open", &self.conn.lock().is_some())
            .finish()
    }
}

impl KvBackend for RedisKvBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheValue>> {
        let mut conn = self.connection()?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::unavailable(TierKind::Shared, e))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.connection()?;
        let result = match ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await,
            None => conn.set::<_, _, ()>(key, value).await,
        };
        result.map_err(|e| CacheError::unavailable(TierKind::Shared, e))
    }

    async fn close(&self) -> CacheResult<()> {
        self.conn.lock().take();
        Ok(())
    }
}

/// Opens a managed (auto-reconnecting) Redis connection for `tier`.
pub(crate) async fn connect_manager(url: &str, tier: TierKind) -> CacheResult<ConnectionManager> {
    let client = redis::Client::open(url).map_err(|e| CacheError::unavailable(tier, e))?;
    ConnectionManager::new(client)
        .await
        .map_err(|e| CacheError::unavailable(tier, e))
}
