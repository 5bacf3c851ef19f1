//! Public query surface over the adapter registry, cache and aggregator.
//!
//! Every operation validates its input before touching the cache or any
//! adapter, reads through the cache, and writes back only results worth
//! replaying. Platform and cache faults never surface as errors.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error as ThisError;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

use crate::domain::aggregator::{DEFAULT_AGGREGATE_TIMEOUT, SearchAggregator};
use crate::domain::ports::{CacheNamespace, PlatformAdapter};
use crate::domain::{
    Account, AggregationOutcome, CacheStats, Error, Platform, ResultCache, SearchQuery,
    SearchResult,
};

/// Deadline for single-account lookups and availability checks.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Raised when registering a second adapter for one platform.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RegistryError {
    /// The platform already has an adapter.
    #[error("an adapter for {platform} is already registered")]
    DuplicatePlatform {
        /// Platform registered twice.
        platform: Platform,
    },
}

/// Adapters keyed by platform, in registration order.
///
/// Populated at startup and read-only afterwards.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn PlatformAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `adapter`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePlatform`] if its platform is taken.
    pub fn register(&mut self, adapter: Arc<dyn PlatformAdapter>) -> Result<(), RegistryError> {
        let platform = adapter.platform_id();
        if self.get(platform).is_some() {
            return Err(RegistryError::DuplicatePlatform { platform });
        }
        debug!(%platform, enabled = adapter.is_enabled(), "adapter registered");
        self.adapters.push(adapter);
        Ok(())
    }

    /// Builder-style [`AdapterRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePlatform`] if its platform is taken.
    pub fn with_adapter(mut self, adapter: Arc<dyn PlatformAdapter>) -> Result<Self, RegistryError> {
        self.register(adapter)?;
        Ok(self)
    }

    /// Adapter registered for `platform`, enabled or not.
    pub fn get(&self, platform: Platform) -> Option<&Arc<dyn PlatformAdapter>> {
        self.adapters
            .iter()
            .find(|adapter| adapter.platform_id() == platform)
    }

    /// Enabled adapters in registration order.
    pub fn enabled(&self) -> impl Iterator<Item = &Arc<dyn PlatformAdapter>> {
        self.adapters.iter().filter(|adapter| adapter.is_enabled())
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Enabled adapters, narrowed to `requested` platform ids when given.
    ///
    /// Unknown, unregistered and disabled ids are dropped silently.
    pub fn select(&self, requested: Option<&[String]>) -> Vec<Arc<dyn PlatformAdapter>> {
        let Some(requested) = requested else {
            return self.enabled().cloned().collect();
        };
        let wanted: Vec<Platform> = requested
            .iter()
            .filter_map(|raw| match raw.parse::<Platform>() {
                Ok(platform) => Some(platform),
                Err(error) => {
                    debug!(error = %error, "ignoring requested platform");
                    None
                }
            })
            .collect();
        self.enabled()
            .filter(|adapter| wanted.contains(&adapter.platform_id()))
            .cloned()
            .collect()
    }
}

/// Deadlines applied by [`SearchService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchServiceConfig {
    /// Shared deadline for one search round.
    pub aggregate_timeout: Duration,
    /// Deadline for account lookups and availability checks.
    pub lookup_timeout: Duration,
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            aggregate_timeout: DEFAULT_AGGREGATE_TIMEOUT,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// Multi-platform account search with read-through caching.
#[derive(Clone)]
pub struct SearchService {
    registry: Arc<AdapterRegistry>,
    cache: ResultCache,
    aggregator: SearchAggregator,
    config: SearchServiceConfig,
}

impl SearchService {
    /// Create a service over a populated registry.
    pub fn new(registry: AdapterRegistry, cache: ResultCache, config: SearchServiceConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            cache,
            aggregator: SearchAggregator::new(),
            config,
        }
    }

    /// Registered adapters.
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Search all enabled platforms, or the enabled subset of `platforms`.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_request` [`Error`] when the keyword or paging is
    /// out of bounds. Platform and cache failures never error.
    pub async fn search_accounts(
        &self,
        keyword: &str,
        platforms: Option<&[String]>,
        page: u32,
        page_size: u32,
    ) -> Result<SearchResult, Error> {
        self.search_accounts_with_outcome(keyword, platforms, page, page_size)
            .await
            .map(|(result, _)| result)
    }

    /// [`SearchService::search_accounts`], also reporting per-platform outcome.
    ///
    /// Cache hits report `cache_hit == true` and no per-platform data.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_request` [`Error`] for invalid queries.
    pub async fn search_accounts_with_outcome(
        &self,
        keyword: &str,
        platforms: Option<&[String]>,
        page: u32,
        page_size: u32,
    ) -> Result<(SearchResult, AggregationOutcome), Error> {
        let query = SearchQuery::new(keyword, page, page_size)?;
        let started = Instant::now();

        let adapters = self.registry.select(platforms);
        if adapters.is_empty() {
            info!(keyword = %query.keyword(), "no enabled platforms selected");
            return Ok((SearchResult::empty(&query), AggregationOutcome::default()));
        }
        let selected: Vec<Platform> = adapters.iter().map(|a| a.platform_id()).collect();

        if let Some(cached) = self.cache.get_aggregate(&query, &selected).await {
            debug!(keyword = %query.keyword(), "serving aggregate search from cache");
            let cached = cached.with_search_time_ms(elapsed_millis(started));
            return Ok((cached, AggregationOutcome::from_cache()));
        }

        let (result, outcome) = self
            .aggregator
            .aggregate(&adapters, &query, self.config.aggregate_timeout)
            .await?;
        if outcome.successful_platforms > 0 {
            self.cache.set_aggregate(&query, &selected, &result).await;
        } else {
            warn!(
                keyword = %query.keyword(),
                platforms = selected.len(),
                "no platform answered; result not cached"
            );
        }
        Ok((result, outcome))
    }

    /// Search one platform, keeping the platform's own ordering.
    ///
    /// Unknown, unregistered or disabled platforms yield an empty result
    /// with `success == false`.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_request` [`Error`] for invalid queries.
    pub async fn search_by_platform(
        &self,
        keyword: &str,
        platform: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchResult, Error> {
        let query = SearchQuery::new(keyword, page, page_size)?;
        let started = Instant::now();

        let Ok(platform) = platform.parse::<Platform>() else {
            debug!(platform, "single-platform search for unknown platform");
            return Ok(SearchResult::unavailable(
                &query,
                None,
                format!("unknown platform: {}", platform.trim()),
            ));
        };
        let adapter = match self.registry.get(platform) {
            Some(adapter) if adapter.is_enabled() => Arc::clone(adapter),
            Some(adapter) => {
                return Ok(SearchResult::unavailable(
                    &query,
                    Some(platform),
                    format!("{} is disabled", adapter.display_name()),
                ));
            }
            None => {
                return Ok(SearchResult::unavailable(
                    &query,
                    Some(platform),
                    format!("no adapter registered for {platform}"),
                ));
            }
        };

        if let Some(cached) = self.cache.get_platform(&query, platform).await {
            debug!(%platform, keyword = %query.keyword(), "serving platform search from cache");
            return Ok(SearchResult::from_platform_result(cached, &query)
                .with_search_time_ms(elapsed_millis(started)));
        }

        let result = self
            .aggregator
            .search_one(adapter, &query, self.config.aggregate_timeout)
            .await;
        if result.is_success() {
            self.cache.set_platform(&query, &result).await;
        } else {
            warn!(
                %platform,
                reason = ?result.failure_reason(),
                error = result.error_message().unwrap_or_default(),
                "single-platform search failed"
            );
        }
        Ok(SearchResult::from_platform_result(result, &query)
            .with_search_time_ms(elapsed_millis(started)))
    }

    /// Look up one account by its platform-native id.
    ///
    /// Unknown platforms, missing accounts and adapter failures all yield
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_request` [`Error`] when `account_id` is blank.
    pub async fn get_account_by_platform_id(
        &self,
        platform: &str,
        account_id: &str,
    ) -> Result<Option<Account>, Error> {
        let account_id = account_id.trim();
        if account_id.is_empty() {
            return Err(
                Error::invalid_request("account id must not be empty").for_field("accountId"),
            );
        }
        let Some(adapter) = self.enabled_adapter(platform) else {
            return Ok(None);
        };
        let platform = adapter.platform_id();

        if let Some(cached) = self.cache.get_account(platform, account_id).await {
            return Ok(Some(cached));
        }

        match timeout(self.config.lookup_timeout, adapter.get_account_info(account_id)).await {
            Ok(Ok(Some(account))) => {
                self.cache.set_account(&account).await;
                Ok(Some(account))
            }
            Ok(Ok(None)) => Ok(None),
            Ok(Err(error)) => {
                warn!(
                    %platform,
                    account_id,
                    reason = %error.reason(),
                    kind = error.kind(),
                    error = %error,
                    "account lookup failed"
                );
                Ok(None)
            }
            Err(_) => {
                warn!(%platform, account_id, "account lookup timed out");
                Ok(None)
            }
        }
    }

    /// Enabled platforms in registration order.
    pub fn get_supported_platforms(&self) -> Vec<Platform> {
        self.registry
            .enabled()
            .map(|adapter| adapter.platform_id())
            .collect()
    }

    /// Whether `platform` is currently reachable, cached briefly.
    ///
    /// Unknown and unregistered platforms report `false`.
    pub async fn platform_status(&self, platform: &str) -> bool {
        let Ok(platform) = platform.parse::<Platform>() else {
            return false;
        };
        let Some(adapter) = self.registry.get(platform).cloned() else {
            return false;
        };
        if let Some(available) = self.cache.get_platform_status(platform).await {
            return available;
        }
        let available = timeout(self.config.lookup_timeout, adapter.check_availability())
            .await
            .unwrap_or_else(|_| {
                warn!(%platform, "availability check timed out");
                false
            });
        self.cache.set_platform_status(platform, available).await;
        available
    }

    /// Per-namespace cache entry counts.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Drop cached entries in `namespace`, or everywhere when `None`.
    pub async fn clear_cache(&self, namespace: Option<CacheNamespace>) -> u64 {
        let removed = self.cache.invalidate(namespace).await;
        info!(
            namespace = namespace.map_or("all", CacheNamespace::as_str),
            removed,
            "cache cleared"
        );
        removed
    }

    fn enabled_adapter(&self, platform: &str) -> Option<Arc<dyn PlatformAdapter>> {
        let platform = platform.parse::<Platform>().ok()?;
        self.registry
            .get(platform)
            .filter(|adapter| adapter.is_enabled())
            .cloned()
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "search_service_tests.rs"]
mod tests;
