//! In-process cache store used when no Redis URL is configured.
//!
//! Entries carry an absolute expiry computed from an injected clock, so
//! tests can step time instead of sleeping. Expired entries read as misses
//! and are purged on access, on prefix scans, and by a sweep every
//! [`SWEEP_EVERY_WRITES`] writes so keys that are never read again still go.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use tokio::sync::RwLock;

use crate::domain::ports::{CacheKey, CacheStore, CacheStoreError};

#[derive(Debug, Clone)]
struct StoredEntry {
    payload: Vec<u8>,
    expires_at: DateTime<Utc>,
}

impl StoredEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Writes between full sweeps of expired entries.
pub const SWEEP_EVERY_WRITES: usize = 128;

#[derive(Debug, Default)]
struct Shelf {
    entries: HashMap<String, StoredEntry>,
    writes_since_sweep: usize,
}

impl Shelf {
    fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| entry.is_live(now));
        self.writes_since_sweep = 0;
    }
}

/// `CacheStore` backed by a shared in-memory map.
pub struct MemoryCacheStore {
    shelf: RwLock<Shelf>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl MemoryCacheStore {
    /// Store whose expiry decisions use `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            shelf: RwLock::new(Shelf::default()),
            clock,
        }
    }

    /// Number of unexpired entries.
    pub async fn len(&self) -> usize {
        let now = self.clock.utc();
        self.shelf
            .read()
            .await
            .entries
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Whether the store holds no unexpired entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Entries held in memory, expired or not.
    pub async fn resident_len(&self) -> usize {
        self.shelf.read().await.entries.len()
    }

    fn expiry(&self, ttl: Duration) -> Result<DateTime<Utc>, CacheStoreError> {
        let delta = TimeDelta::from_std(ttl)
            .map_err(|error| CacheStoreError::backend(format!("ttl out of range: {error}")))?;
        self.clock
            .utc()
            .checked_add_signed(delta)
            .ok_or_else(|| CacheStoreError::backend("ttl overflows the clock range"))
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheStoreError> {
        let now = self.clock.utc();
        let mut shelf = self.shelf.write().await;
        match shelf.entries.get(key.as_str()) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.payload.clone())),
            Some(_) => {
                shelf.entries.remove(key.as_str());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &CacheKey,
        payload: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), CacheStoreError> {
        let expires_at = self.expiry(ttl)?;
        let mut shelf = self.shelf.write().await;
        shelf.writes_since_sweep += 1;
        if shelf.writes_since_sweep >= SWEEP_EVERY_WRITES {
            shelf.purge_expired(self.clock.utc());
        }
        shelf.entries.insert(
            key.as_str().to_owned(),
            StoredEntry {
                payload,
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), CacheStoreError> {
        self.shelf.write().await.entries.remove(key.as_str());
        Ok(())
    }

    async fn count_prefix(&self, prefix: &str) -> Result<u64, CacheStoreError> {
        let now = self.clock.utc();
        let mut shelf = self.shelf.write().await;
        shelf.purge_expired(now);
        let count = shelf
            .entries
            .keys().filter(|key| key.starts_with(prefix)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheStoreError> {
        let now = self.clock.utc();
        let mut shelf = self.shelf.write().await;
        shelf.purge_expired(now);
        let before = shelf.entries.len();
        shelf.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - shelf.entries.len();
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
