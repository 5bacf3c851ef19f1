//! Assemble the search service from settings.

use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::{Context, Result};
use tracing::{info, warn};

use account_search::config::SearchSettings;
use account_search::domain::ports::{CacheStore, PlatformAdapter};
use account_search::domain::{
    Account, AdapterRegistry, CacheKeyBuilder, Platform, ResultCache, SearchService,
};
use account_search::outbound::cache::{MemoryCacheStore, RedisCacheStore};
use account_search::outbound::platform::{HttpPlatformAdapter, InMemoryPlatformAdapter};

/// Build the service described by `settings`.
pub(crate) async fn build_service(settings: &SearchSettings, demo: bool) -> Result<SearchService> {
    let registry = build_registry(settings, demo)?;
    if registry.is_empty() {
        warn!("no platforms configured; set ACCOUNT_SEARCH_PLATFORM_ENDPOINTS or pass --demo");
    }
    let cache = build_cache(settings).await;
    Ok(SearchService::new(
        registry,
        cache,
        settings.service_config(),
    ))
}

async fn build_cache(settings: &SearchSettings) -> ResultCache {
    let store: Arc<dyn CacheStore> = match settings.redis_url() {
        Some(url) => match RedisCacheStore::connect(url).await {
            Ok(store) => {
                info!("using redis cache store");
                Arc::new(store)
            }
            Err(error) => {
                warn!(error = %error, "redis unavailable; falling back to in-process cache");
                Arc::new(MemoryCacheStore::default())
            }
        },
        None => Arc::new(MemoryCacheStore::default()),
    };
    ResultCache::with_keys(
        store,
        CacheKeyBuilder::new(settings.key_prefix()),
        settings.cache_ttls(),
    )
}

fn build_registry(settings: &SearchSettings, demo: bool) -> Result<AdapterRegistry> {
    let mut registry = AdapterRegistry::new();
    for (platform, base_url) in settings
        .platform_endpoints()
        .wrap_err("invalid platform endpoint settings")?
    {
        let adapter = HttpPlatformAdapter::new(platform, base_url, settings.aggregate_timeout())
            .wrap_err_with(|| format!("failed to build http client for {platform}"))?;
        registry
            .register(Arc::new(adapter))
            .wrap_err("duplicate platform endpoint")?;
    }

    if demo {
        for platform in Platform::ALL {
            if registry.get(platform).is_some() {
                continue;
            }
            let adapter: Arc<dyn PlatformAdapter> =
                Arc::new(InMemoryPlatformAdapter::new(platform, demo_accounts(platform)));
            registry
                .register(adapter)
                .wrap_err("failed to register demo adapter")?;
        }
    }
    Ok(registry)
}

/// Small fixed dataset with cross-platform duplicates for trying the CLI.
fn demo_accounts(platform: Platform) -> Vec<Account> {
    let now = Utc::now();
    let offset = u64::try_from(
        Platform::ALL
            .iter()
            .position(|candidate| *candidate == platform)
            .unwrap_or_default(),
    )
    .unwrap_or_default();
    [
        ("科技达人", "每日科技资讯与评测", 12_000, true),
        ("美食日记", "家常菜与探店", 8_500, false),
        ("旅行笔记", "带你看世界", 3_200, false),
        ("Rust 中文社区", "系统编程与 Rust 学习", 21_000, true),
        ("测试工程师小王", "软件测试经验分享", 950, false),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (name, description, followers, verified))| {
        Account::new(platform, format!("{platform}-{index}"), name, now)
            .with_description(description)
            .with_follower_count(followers + offset * 1_000)
            .with_verified(verified)
    })
    .collect()
}
