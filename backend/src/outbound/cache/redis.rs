//! Redis-backed cache store.
//!
//! Entries are written with `SET .. EX` so Redis owns expiry. Prefix counts
//! and bulk deletes walk the keyspace with `SCAN MATCH` cursors rather than
//! `KEYS`, keeping the server responsive on large datasets.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::{self, RedisError};
use tracing::debug;

use crate::domain::ports::{CacheKey, CacheStore, CacheStoreError};

const SCAN_BATCH: usize = 500;
const DELETE_BATCH: usize = 200;
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(2);

/// `CacheStore` backed by a pooled Redis connection.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCacheStore {
    /// Connect a pool to `url` (for example `redis://127.0.0.1:6379`).
    ///
    /// # Errors
    ///
    /// Returns [`CacheStoreError::Backend`] for malformed URLs or when the
    /// first connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self, CacheStoreError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|error| CacheStoreError::backend(format!("invalid redis url: {error}")))?;
        let pool = Pool::builder()
            .connection_timeout(CONNECTION_TIMEOUT)
            .build(manager)
            .await
            .map_err(map_redis_error)?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, CacheStoreError> {
        self.pool
            .get()
            .await
            .map_err(|error| CacheStoreError::backend(format!("redis pool: {error}")))
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheStoreError> {
        let pattern = format!("{}*", escape_glob(prefix));
        let mut conn = self.connection().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_error)?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStoreError> {
        let mut conn = self.connection().await?;
        let payload: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(payload)
    }

    async fn set(
        &self,
        key: &CacheKey,
        payload: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheStoreError> {
        let mut conn = self.connection().await?;
        let () = redis::cmd("SET")
            .arg(key.as_str())
            .arg(payload)
            .arg("EX")
            .arg(expiry_seconds(ttl))
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheStoreError> {
        let mut conn = self.connection().await?;
        let removed: u64 = redis::cmd("DEL")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        debug!(cache_key = %key, removed, "redis key deleted");
        Ok(())
    }

    async fn count_prefix(&self, prefix: &str) -> Result<u64, CacheStoreError> {
        let keys = self.scan_prefix(prefix).await?;
        Ok(u64::try_from(keys.len()).unwrap_or(u64::MAX))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheStoreError> {
        let keys = self.scan_prefix(prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        let mut removed = 0_u64;
        for chunk in keys.chunks(DELETE_BATCH) {
            let count: u64 = redis::cmd("DEL")
                .arg(chunk)
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_error)?;
            removed += count;
        }
        Ok(removed)
    }
}

fn map_redis_error(error: RedisError) -> CacheStoreError {
    CacheStoreError::backend(error.to_string())
}

/// Redis rejects `EX 0`, so sub-second TTLs round up to one second.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Escape glob metacharacters so `prefix` matches literally in `SCAN MATCH`.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    //! Pure helper coverage; live Redis behaviour is exercised out of band.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("account_search:aggregate:", "account_search:aggregate:")]
    #[case("odd*prefix?", "odd\\*prefix\\?")]
    #[case("[x]\\", "\\[x\\]\\\\")]
    fn glob_metacharacters_are_escaped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_glob(raw), expected);
    }

    #[rstest]
    #[case(Duration::ZERO, 1)]
    #[case(Duration::from_millis(1_500), 1)]
    #[case(Duration::from_secs(300), 300)]
    fn ttls_round_to_whole_seconds(#[case] ttl: Duration, #[case] expected: u64) {
        assert_eq!(expiry_seconds(ttl), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_urls_are_backend_errors() {
        let err = RedisCacheStore::connect("not a url")
            .await
            .err()
            .expect("malformed url rejected");
        assert!(matches!(err, CacheStoreError::Backend { .. }));
    }
}
