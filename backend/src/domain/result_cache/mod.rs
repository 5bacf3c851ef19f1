//! Best-effort, tiered cache for search results.
//!
//! Wraps a [`CacheStore`] with typed accessors for each namespace. Every
//! store or serialisation fault is logged and swallowed: reads degrade to a
//! miss and writes to a no-op, so an outage falls through to live searches.

mod keys;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use keys::{CacheKeyBuilder, CacheKeyError, DEFAULT_KEY_PREFIX};

use crate::domain::ports::{CacheKey, CacheNamespace, CacheStore};
use crate::domain::{Account, FailureReason, Platform, PlatformSearchResult, SearchQuery, SearchResult};

/// Time-to-live for each namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Merged multi-platform results.
    pub aggregate: Duration,
    /// Single-platform results.
    pub platform: Duration,
    /// Account lookups.
    pub account: Duration,
    /// Availability checks.
    pub platform_status: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            aggregate: Duration::from_secs(5 * 60),
            platform: Duration::from_secs(5 * 60),
            account: Duration::from_secs(30 * 60),
            platform_status: Duration::from_secs(60),
        }
    }
}

impl CacheTtls {
    /// TTL applied to `namespace`.
    pub fn for_namespace(&self, namespace: CacheNamespace) -> Duration {
        match namespace {
            CacheNamespace::Aggregate => self.aggregate,
            CacheNamespace::Platform => self.platform,
            CacheNamespace::Account => self.account,
            CacheNamespace::PlatformStatus => self.platform_status,
        }
    }
}

/// Live key counts per namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Aggregate search entries.
    pub aggregate: u64,
    /// Single-platform search entries.
    pub platform: u64,
    /// Account lookup entries.
    pub account: u64,
    /// Availability check entries.
    pub platform_status: u64,
    /// Sum of all namespaces.
    pub total: u64,
}

impl CacheStats {
    fn record(&mut self, namespace: CacheNamespace, count: u64) {
        match namespace {
            CacheNamespace::Aggregate => self.aggregate = count,
            CacheNamespace::Platform => self.platform = count,
            CacheNamespace::Account => self.account = count,
            CacheNamespace::PlatformStatus => self.platform_status = count,
        }
        self.total += count;
    }
}

/// Typed, fault-tolerant view over a cache store.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    keys: CacheKeyBuilder,
    ttls: CacheTtls,
}

impl ResultCache {
    /// Cache over `store` with default key prefix.
    pub fn new(store: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self::with_keys(store, CacheKeyBuilder::default(), ttls)
    }

    /// Cache over `store` with an explicit key builder.
    pub fn with_keys(store: Arc<dyn CacheStore>, keys: CacheKeyBuilder, ttls: CacheTtls) -> Self {
        Self { store, keys, ttls }
    }

    /// Configured TTLs.
    pub fn ttls(&self) -> CacheTtls {
        self.ttls
    }

    /// Cached merged result for `query` over `platforms`.
    pub async fn get_aggregate(
        &self,
        query: &SearchQuery,
        platforms: &[Platform],
    ) -> Option<SearchResult> {
        let key = self
            .keys
            .search_key(CacheNamespace::Aggregate, query, platforms);
        self.read(CacheNamespace::Aggregate, key).await
    }

    /// Store a merged result for `query` over `platforms`.
    pub async fn set_aggregate(
        &self,
        query: &SearchQuery,
        platforms: &[Platform],
        result: &SearchResult,
    ) {
        let key = self
            .keys
            .search_key(CacheNamespace::Aggregate, query, platforms);
        self.write(CacheNamespace::Aggregate, key, result).await;
    }

    /// Cached single-platform result for `query`.
    pub async fn get_platform(
        &self,
        query: &SearchQuery,
        platform: Platform,
    ) -> Option<PlatformSearchResult> {
        let key = self
            .keys
            .search_key(CacheNamespace::Platform, query, &[platform]);
        self.read(CacheNamespace::Platform, key).await
    }

    /// Store a single-platform result for `query`.
    pub async fn set_platform(&self, query: &SearchQuery, result: &PlatformSearchResult) {
        let key = self
            .keys
            .search_key(CacheNamespace::Platform, query, &[result.platform()]);
        self.write(CacheNamespace::Platform, key, result).await;
    }

    /// Cached account by platform-native id.
    pub async fn get_account(&self, platform: Platform, account_id: &str) -> Option<Account> {
        let key = self.keys.account_key(platform, account_id);
        self.read(CacheNamespace::Account, key).await
    }

    /// Store an account under its platform-native id.
    pub async fn set_account(&self, account: &Account) {
        let key = self
            .keys
            .account_key(account.platform, &account.platform_account_id);
        self.write(CacheNamespace::Account, key, account).await;
    }

    /// Cached availability of `platform`.
    pub async fn get_platform_status(&self, platform: Platform) -> Option<bool> {
        let key = self.keys.platform_status_key(platform);
        self.read(CacheNamespace::PlatformStatus, key).await
    }

    /// Store the availability of `platform`.
    pub async fn set_platform_status(&self, platform: Platform, available: bool) {
        let key = self.keys.platform_status_key(platform);
        self.write(CacheNamespace::PlatformStatus, key, &available)
            .await;
    }

    /// Drop every key in `namespace`, or in all namespaces when `None`.
    ///
    /// Returns the number of removed keys; store failures count as zero.
    pub async fn invalidate(&self, namespace: Option<CacheNamespace>) -> u64 {
        let prefix = namespace.map_or_else(
            || self.keys.root_prefix(),
            |namespace| self.keys.namespace_prefix(namespace),
        );
        match self.store.delete_prefix(&prefix).await {
            Ok(removed) => {
                debug!(prefix = %prefix, removed, "cache invalidated");
                removed
            }
            Err(error) => {
                warn!(
                    prefix = %prefix,
                    reason = %FailureReason::CacheUnavailable,
                    kind = error.kind(),
                    error = %error,
                    "cache invalidation failed"
                );
                0
            }
        }
    }

    /// Per-namespace key counts; unreachable namespaces report zero.
    pub async fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for namespace in CacheNamespace::ALL {
            let prefix = self.keys.namespace_prefix(namespace);
            let count = match self.store.count_prefix(&prefix).await {
                Ok(count) => count,
                Err(error) => {
                    warn!(
                        namespace = %namespace,
                        reason = %FailureReason::CacheUnavailable,
                        kind = error.kind(),
                        error = %error,
                        "cache stats unavailable"
                    );
                    0
                }
            };
            stats.record(namespace, count);
        }
        stats
    }

    async fn read<T: DeserializeOwned>(
        &self,
        namespace: CacheNamespace,
        key: Result<CacheKey, CacheKeyError>,
    ) -> Option<T> {
        let key = match key {
            Ok(key) => key,
            Err(error) => {
                warn!(namespace = %namespace, error = %error, "cache key derivation failed");
                return None;
            }
        };
        let payload = match self.store.get(&key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(cache_key = %key, "cache miss");
                return None;
            }
            Err(error) => {
                warn!(
                    cache_key = %key,
                    reason = %FailureReason::CacheUnavailable,
                    kind = error.kind(),
                    error = %error,
                    "cache read failed; treating as miss"
                );
                return None;
            }
        };
        match serde_json::from_slice(&payload) {
            Ok(value) => {
                debug!(cache_key = %key, "cache hit");
                Some(value)
            }
            Err(error) => {
                warn!(cache_key = %key, error = %error, "discarding undecodable cache entry");
                if let Err(delete_error) = self.store.delete(&key).await {
                    debug!(cache_key = %key, error = %delete_error, "cache delete failed");
                }
                None
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        namespace: CacheNamespace,
        key: Result<CacheKey, CacheKeyError>,
        value: &T,
    ) {
        let key = match key {
            Ok(key) => key,
            Err(error) => {
                warn!(namespace = %namespace, error = %error, "cache key derivation failed");
                return;
            }
        };
        let payload = match serde_json::to_vec(value) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(cache_key = %key, error = %error, "cache payload serialisation failed");
                return;
            }
        };
        let ttl = self.ttls.for_namespace(namespace);
        if let Err(error) = self.store.set(&key, payload, ttl).await {
            warn!(
                cache_key = %key,
                reason = %FailureReason::CacheUnavailable,
                kind = error.kind(),
                error = %error,
                "cache write failed; continuing without cache"
            );
        }
    }
}

#[cfg(test)]
mod tests;
