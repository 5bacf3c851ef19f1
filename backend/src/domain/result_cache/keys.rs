//! Deterministic cache key derivation.
//!
//! Search keys hash `(keyword, sorted platforms, page, pageSize)` as canonical
//! JSON, so logically identical queries collide no matter how the caller
//! ordered the platform list. Lookup and status keys are readable paths.

use serde_json::json;
use thiserror::Error;

use crate::domain::ports::{CacheKey, CacheKeyValidationError, CacheNamespace};
use crate::domain::{ContentHashError, Platform, SearchQuery, canonicalize_and_hash};

/// Prefix applied to every key when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "account_search";

/// Failure to derive a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyError {
    /// The query payload could not be hashed.
    #[error(transparent)]
    Hash(#[from] ContentHashError),
    /// The derived key was malformed.
    #[error(transparent)]
    Invalid(#[from] CacheKeyValidationError),
}

/// Builds namespaced keys under one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeyBuilder {
    prefix: String,
}

impl Default for CacheKeyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl CacheKeyBuilder {
    /// Builder for keys under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Prefix shared by every key in `namespace`, including the separator.
    pub fn namespace_prefix(&self, namespace: CacheNamespace) -> String {
        format!("{}:{namespace}:", self.prefix)
    }

    /// Prefix shared by every key this builder produces.
    pub fn root_prefix(&self) -> String {
        format!("{}:", self.prefix)
    }

    /// Key for a search over `platforms` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheKeyError`] if hashing fails or the prefix is malformed.
    ///
    /// # Examples
    /// ```
    /// use account_search::domain::ports::CacheNamespace;
    /// use account_search::domain::{CacheKeyBuilder, Platform, SearchQuery};
    ///
    /// let keys = CacheKeyBuilder::default();
    /// let query = SearchQuery::new("rust", 1, 20).expect("valid query");
    /// let a = keys
    ///     .search_key(CacheNamespace::Aggregate, &query, &[Platform::Weibo, Platform::Wechat])
    ///     .expect("key");
    /// let b = keys
    ///     .search_key(CacheNamespace::Aggregate, &query, &[Platform::Wechat, Platform::Weibo])
    ///     .expect("key");
    /// assert_eq!(a, b);
    /// ```
    pub fn search_key(
        &self,
        namespace: CacheNamespace,
        query: &SearchQuery,
        platforms: &[Platform],
    ) -> Result<CacheKey, CacheKeyError> {
        let mut platform_ids: Vec<&str> = platforms.iter().map(|p| p.as_str()).collect();
        platform_ids.sort_unstable();
        platform_ids.dedup();

        let payload = json!({
            "keyword": query.keyword(),
            "platforms": platform_ids,
            "page": query.page(),
            "pageSize": query.page_size(),
        });
        let hash = canonicalize_and_hash(&payload)?;
        let key = format!("{}{}", self.namespace_prefix(namespace), hash.short_hex());
        Ok(CacheKey::new(key)?)
    }

    /// Key for one account lookup.
    ///
    /// # Errors
    ///
    /// Returns [`CacheKeyError::Invalid`] when the id carries padding.
    pub fn account_key(
        &self,
        platform: Platform,
        platform_account_id: &str,
    ) -> Result<CacheKey, CacheKeyError> {
        let key = format!(
            "{}{platform}:{platform_account_id}",
            self.namespace_prefix(CacheNamespace::Account)
        );
        Ok(CacheKey::new(key)?)
    }

    /// Key for one platform availability check.
    ///
    /// # Errors
    ///
    /// Returns [`CacheKeyError::Invalid`] when the prefix is malformed.
    pub fn platform_status_key(&self, platform: Platform) -> Result<CacheKey, CacheKeyError> {
        let key = format!(
            "{}{platform}",
            self.namespace_prefix(CacheNamespace::PlatformStatus)
        );
        Ok(CacheKey::new(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn keys() -> CacheKeyBuilder {
        CacheKeyBuilder::default()
    }

    fn query(keyword: &str, page: u32, page_size: u32) -> SearchQuery {
        SearchQuery::new(keyword, page, page_size).expect("valid query")
    }

    #[rstest]
    #[case("科技", 1, 10)]
    #[case("rust", 3, 50)]
    fn platform_order_does_not_change_search_keys(
        keys: CacheKeyBuilder,
        #[case] keyword: &str,
        #[case] page: u32,
        #[case] page_size: u32,
    ) {
        let query = query(keyword, page, page_size);
        let forward = keys
            .search_key(
                CacheNamespace::Aggregate,
                &query,
                &[Platform::Weibo, Platform::Wechat],
            )
            .expect("forward key");
        let reverse = keys
            .search_key(
                CacheNamespace::Aggregate,
                &query,
                &[Platform::Wechat, Platform::Weibo],
            )
            .expect("reverse key");
        assert_eq!(forward, reverse);
    }

    #[rstest]
    fn distinct_queries_get_distinct_keys(keys: CacheKeyBuilder) {
        let platforms = [Platform::Weibo];
        let base = keys
            .search_key(CacheNamespace::Aggregate, &query("rust", 1, 10), &platforms)
            .expect("base");
        let other_page = keys
            .search_key(CacheNamespace::Aggregate, &query("rust", 2, 10), &platforms)
            .expect("page");
        let other_size = keys
            .search_key(CacheNamespace::Aggregate, &query("rust", 1, 20), &platforms)
            .expect("size");
        let other_keyword = keys
            .search_key(CacheNamespace::Aggregate, &query("go", 1, 10), &platforms)
            .expect("keyword");

        assert_ne!(base, other_page);
        assert_ne!(base, other_size);
        assert_ne!(base, other_keyword);
    }

    #[rstest]
    fn namespaces_partition_identical_queries(keys: CacheKeyBuilder) {
        let query = query("rust", 1, 10);
        let aggregate = keys
            .search_key(CacheNamespace::Aggregate, &query, &[Platform::Zhihu])
            .expect("aggregate");
        let platform = keys
            .search_key(CacheNamespace::Platform, &query, &[Platform::Zhihu])
            .expect("platform");

        assert_ne!(aggregate, platform);
        assert!(aggregate.as_str().starts_with("account_search:aggregate:"));
        assert!(platform.as_str().starts_with("account_search:platform:"));
    }

    #[rstest]
    fn lookup_and_status_keys_are_readable(keys: CacheKeyBuilder) {
        let account = keys.account_key(Platform::Weibo, "1001").expect("account key");
        let status = keys.platform_status_key(Platform::Douyin).expect("status key");

        assert_eq!(account.as_str(), "account_search:account:weibo:1001");
        assert_eq!(status.as_str(), "account_search:platform_status:douyin");
    }

    #[rstest]
    fn padded_account_ids_are_rejected(keys: CacheKeyBuilder) {
        let result = keys.account_key(Platform::Weibo, "1001 ");
        assert_eq!(
            result,
            Err(CacheKeyError::Invalid(
                CacheKeyValidationError::ContainsWhitespace
            ))
        );
    }
}
