//! Behaviour of the typed cache over healthy and failing stores.

use std::sync::Arc;

use chrono::Utc;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{CacheStoreError, MockCacheStore};
use crate::outbound::cache::MemoryCacheStore;

#[fixture]
fn query() -> SearchQuery {
    SearchQuery::new("科技", 1, 20).expect("valid query")
}

#[fixture]
fn cache() -> ResultCache {
    ResultCache::new(Arc::new(MemoryCacheStore::default()), CacheTtls::default())
}

fn account(id: &str, name: &str) -> Account {
    Account::new(Platform::Weibo, id, name, Utc::now()).with_follower_count(42)
}

fn failing_store() -> MockCacheStore {
    let mut store = MockCacheStore::new();
    store
        .expect_get()
        .returning(|_| Err(CacheStoreError::backend("connection refused")));
    store
        .expect_set()
        .returning(|_, _, _| Err(CacheStoreError::backend("connection refused")));
    store
        .expect_delete()
        .returning(|_| Err(CacheStoreError::backend("connection refused")));
    store
        .expect_count_prefix()
        .returning(|_| Err(CacheStoreError::backend("connection refused")));
    store
        .expect_delete_prefix()
        .returning(|_| Err(CacheStoreError::backend("connection refused")));
    store
}

#[rstest]
#[tokio::test]
async fn aggregate_round_trips_regardless_of_platform_order(
    cache: ResultCache,
    query: SearchQuery,
) {
    let mut result = SearchResult::empty(&query);
    result.accounts = vec![account("1", "科技达人")];
    result.total = 1;

    cache
        .set_aggregate(&query, &[Platform::Weibo, Platform::Wechat], &result)
        .await;

    let cached = cache
        .get_aggregate(&query, &[Platform::Wechat, Platform::Weibo])
        .await;
    assert_eq!(cached, Some(result));
    assert_eq!(cache.get_aggregate(&query, &[Platform::Weibo]).await, None);
}

#[rstest]
#[tokio::test]
async fn tiers_are_isolated(cache: ResultCache, query: SearchQuery) {
    let platform_result =
        PlatformSearchResult::succeeded(Platform::Weibo, vec![account("1", "a")], 1);
    cache.set_platform(&query, &platform_result).await;

    assert_eq!(
        cache.get_platform(&query, Platform::Weibo).await,
        Some(platform_result)
    );
    assert_eq!(cache.get_platform(&query, Platform::Zhihu).await, None);
    assert_eq!(cache.get_aggregate(&query, &[Platform::Weibo]).await, None);
}

#[rstest]
#[tokio::test]
async fn accounts_and_status_round_trip(cache: ResultCache) {
    let stored = account("1001", "科技达人");
    cache.set_account(&stored).await;
    cache.set_platform_status(Platform::Douyin, false).await;

    assert_eq!(cache.get_account(Platform::Weibo, "1001").await, Some(stored));
    assert_eq!(cache.get_account(Platform::Wechat, "1001").await, None);
    assert_eq!(cache.get_platform_status(Platform::Douyin).await, Some(false));
    assert_eq!(cache.get_platform_status(Platform::Weibo).await, None);
}

#[rstest]
#[tokio::test]
async fn stats_count_each_namespace(cache: ResultCache, query: SearchQuery) {
    cache
        .set_aggregate(&query, &[Platform::Weibo], &SearchResult::empty(&query))
        .await;
    cache.set_account(&account("1", "a")).await;
    cache.set_account(&account("2", "b")).await;
    cache.set_platform_status(Platform::Weibo, true).await;

    let stats = cache.stats().await;
    assert_eq!(
        stats,
        CacheStats {
            aggregate: 1,
            platform: 0,
            account: 2,
            platform_status: 1,
            total: 4,
        }
    );
}

#[rstest]
#[tokio::test]
async fn invalidate_scopes_to_namespace_or_everything(cache: ResultCache, query: SearchQuery) {
    cache
        .set_aggregate(&query, &[Platform::Weibo], &SearchResult::empty(&query))
        .await;
    cache.set_account(&account("1", "a")).await;
    cache.set_platform_status(Platform::Weibo, true).await;

    assert_eq!(cache.invalidate(Some(CacheNamespace::Account)).await, 1);
    assert_eq!(cache.get_account(Platform::Weibo, "1").await, None);
    assert_eq!(cache.stats().await.total, 2);

    assert_eq!(cache.invalidate(None).await, 2);
    assert_eq!(cache.stats().await, CacheStats::default());
}

#[rstest]
#[tokio::test]
async fn failing_store_degrades_to_misses(query: SearchQuery) {
    let cache = ResultCache::new(Arc::new(failing_store()), CacheTtls::default());

    cache
        .set_aggregate(&query, &[Platform::Weibo], &SearchResult::empty(&query))
        .await;
    cache.set_account(&account("1", "a")).await;

    assert_eq!(cache.get_aggregate(&query, &[Platform::Weibo]).await, None);
    assert_eq!(cache.get_account(Platform::Weibo, "1").await, None);
    assert_eq!(cache.get_platform_status(Platform::Weibo).await, None);
    assert_eq!(cache.stats().await, CacheStats::default());
    assert_eq!(cache.invalidate(None).await, 0);
}

#[rstest]
#[tokio::test]
async fn undecodable_entries_are_dropped(query: SearchQuery) {
    let mut store = MockCacheStore::new();
    store
        .expect_get()
        .times(1)
        .returning(|_| Ok(Some(b"not json".to_vec())));
    store.expect_delete().times(1).returning(|_| Ok(()));
    let cache = ResultCache::new(Arc::new(store), CacheTtls::default());

    assert_eq!(cache.get_aggregate(&query, &[Platform::Weibo]).await, None);
}

#[rstest]
#[tokio::test]
async fn writes_use_namespace_ttl(query: SearchQuery) {
    let ttls = CacheTtls {
        platform: Duration::from_secs(7),
        ..CacheTtls::default()
    };
    let mut store = MockCacheStore::new();
    store
        .expect_set()
        .withf(|key, _, ttl| {
            key.as_str().starts_with("account_search:platform:") && *ttl == Duration::from_secs(7)
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let cache = ResultCache::new(Arc::new(store), ttls);

    cache
        .set_platform(
            &query,
            &PlatformSearchResult::succeeded(Platform::Zhihu, Vec::new(), 0),
        )
        .await;
}

#[rstest]
fn namespace_ttls_follow_settings() {
    let ttls = CacheTtls::default();
    assert_eq!(
        ttls.for_namespace(CacheNamespace::Account),
        Duration::from_secs(1800)
    );
    assert_eq!(
        ttls.for_namespace(CacheNamespace::PlatformStatus),
        Duration::from_secs(60)
    );
}
