//! Port interface for the key-value store backing the result cache.
use std::time::Duration;

use async_trait::async_trait;

use super::{CacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by cache store adapters.
    pub enum CacheStoreError {
        /// Store is unreachable, timing out, or rejected the command.
        Backend { message: String } => "cache backend failure: {message}",
        /// Stored payload could not be encoded or decoded.
        Serialization { message: String } => "cache serialisation failed: {message}",
    }
}

/// Byte-oriented cache storage with per-key expiry.
///
/// Atomicity is per key. Prefix operations back the stats and bulk
/// invalidation surface and may be slow on large stores.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the payload stored under `key`, if present and unexpired.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStoreError>;

    /// Store `payload` under `key`, expiring after `ttl`.
    async fn set(&self, key: &CacheKey, payload: Vec<u8>, ttl: Duration)
    -> Result<(), CacheStoreError>;

    /// Remove `key`. Missing keys are not an error.
    async fn delete(&self, key: &CacheKey) -> Result<(), CacheStoreError>;

    /// Count live keys starting with `prefix`.
    async fn count_prefix(&self, prefix: &str) -> Result<u64, CacheStoreError>;

    /// Remove every key starting with `prefix`, returning how many went.
    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheStoreError>;
}
