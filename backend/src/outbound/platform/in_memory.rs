//! Platform adapter serving a fixed account list.
//!
//! Used by tests and the binary's demo mode. Behaves like a well-mannered
//! platform: filters by keyword, paginates, and reports failures as data.
//! Latency, forced failures and the enabled flag are configurable so callers
//! can reproduce slow or broken platforms deterministically.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::Value;

use super::dto::RawAccountRecord;
use crate::domain::ports::{PlatformAdapter, PlatformAdapterError};
use crate::domain::{Account, Platform, PlatformSearchResult, normalize_name};

/// In-process [`PlatformAdapter`] over a fixed set of accounts.
pub struct InMemoryPlatformAdapter {
    platform: Platform,
    display_name: String,
    accounts: Vec<Account>,
    enabled: bool,
    latency: Duration,
    failure: Option<PlatformAdapterError>,
    clock: Arc<dyn Clock>,
    search_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
}

impl InMemoryPlatformAdapter {
    /// Enabled adapter for `platform` serving `accounts`.
    pub fn new(platform: Platform, accounts: Vec<Account>) -> Self {
        Self {
            platform,
            display_name: default_display_name(platform).to_owned(),
            accounts,
            enabled: true,
            latency: Duration::ZERO,
            failure: None,
            clock: Arc::new(DefaultClock),
            search_calls: AtomicUsize::new(0),
            lookup_calls: AtomicUsize::new(0),
        }
    }

    /// Override the human-readable name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Delay every search and lookup by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail every search and lookup with `failure`.
    #[must_use]
    pub fn with_failure(mut self, failure: PlatformAdapterError) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Use `clock` for timestamps on normalised records.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Mark the adapter as switched off.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Number of `search_accounts` invocations so far.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_account_info` invocations so far.
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn matches(account: &Account, needle: &str) -> bool {
        normalize_name(&account.name).contains(needle)
            || normalize_name(&account.description).contains(needle)
    }
}

fn default_display_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Wechat => "WeChat",
        Platform::Weibo => "Weibo",
        Platform::Twitter => "Twitter",
        Platform::Douyin => "Douyin",
        Platform::Zhihu => "Zhihu",
        Platform::Bilibili => "Bilibili",
        Platform::Xiaohongshu => "Xiaohongshu",
    }
}

#[async_trait]
impl PlatformAdapter for InMemoryPlatformAdapter {
    fn platform_id(&self) -> Platform {
        self.platform
    }

    fn display_name(&self) -> String {
        self.display_name.clone()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn search_accounts(&self, keyword: &str, page: u32, page_size: u32) -> PlatformSearchResult {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if let Some(failure) = &self.failure {
            return failure.clone().into_search_result(self.platform);
        }

        let needle = normalize_name(keyword);
        let matching: Vec<&Account> = self
            .accounts
            .iter()
            .filter(|account| Self::matches(account, &needle))
            .collect();
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let start = usize::try_from(page.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(usize::try_from(page_size).unwrap_or(usize::MAX));
        let accounts = matching
            .into_iter()
            .skip(start)
            .take(usize::try_from(page_size).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        PlatformSearchResult::succeeded(self.platform, accounts, total)
    }

    async fn get_account_info(
        &self,
        account_id: &str,
    ) -> Result<Option<Account>, PlatformAdapterError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        Ok(self
            .accounts
            .iter()
            .find(|account| account.platform_account_id == account_id)
            .cloned())
    }

    fn normalize_account_data(&self, raw: &Value) -> Result<Account, PlatformAdapterError> {
        RawAccountRecord::from_value(raw)
            .and_then(|record| record.into_account(self.platform, self.clock.utc()))
            .map_err(PlatformAdapterError::data_parsing)
    }

    async fn check_availability(&self) -> bool {
        self.enabled && self.failure.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use crate::domain::FailureReason;

    #[fixture]
    fn adapter() -> InMemoryPlatformAdapter {
        let now = Utc::now();
        InMemoryPlatformAdapter::new(
            Platform::Weibo,
            vec![
                Account::new(Platform::Weibo, "1", "科技达人", now),
                Account::new(Platform::Weibo, "2", "美食日记", now).with_description("科技与美食"),
                Account::new(Platform::Weibo, "3", "科技前沿", now),
                Account::new(Platform::Weibo, "4", "旅行", now),
            ],
        )
    }

    #[rstest]
    #[tokio::test]
    async fn search_filters_and_paginates(adapter: InMemoryPlatformAdapter) {
        let first = adapter.search_accounts("科技", 1, 2).await;
        let second = adapter.search_accounts("科技", 2, 2).await;

        assert!(first.is_success());
        assert_eq!(first.total(), 3);
        assert_eq!(first.accounts().len(), 2);
        assert_eq!(second.accounts().len(), 1);
        assert_eq!(second.accounts()[0].platform_account_id, "3");
        assert_eq!(adapter.search_calls(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn forced_failure_is_reported_as_data(adapter: InMemoryPlatformAdapter) {
        let adapter = adapter.with_failure(PlatformAdapterError::timeout("upstream"));

        let result = adapter.search_accounts("科技", 1, 10).await;
        assert_eq!(result.failure_reason(), Some(FailureReason::Timeout));
        assert!(adapter.get_account_info("1").await.is_err());
        assert!(!adapter.check_availability().await);
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_finds_by_platform_id(adapter: InMemoryPlatformAdapter) {
        let found = adapter.get_account_info("2").await.expect("lookup succeeds");
        assert_eq!(found.map(|a| a.name), Some("美食日记".to_owned()));
        assert_eq!(adapter.get_account_info("99").await.expect("lookup succeeds"), None);
        assert_eq!(adapter.lookup_calls(), 2);
    }

    #[rstest]
    fn normalises_raw_records(adapter: InMemoryPlatformAdapter) {
        let account = adapter
            .normalize_account_data(&json!({ "id": "9", "nickname": "新账号", "fans": 12 }))
            .expect("valid record");
        assert_eq!(account.platform, Platform::Weibo);
        assert_eq!(account.follower_count, 12);

        let err = adapter
            .normalize_account_data(&json!({ "nickname": "no id" }))
            .expect_err("missing id rejected");
        assert!(matches!(err, PlatformAdapterError::DataParsing { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn description_matches_ignore_spacing() {
        let adapter = InMemoryPlatformAdapter::new(
            Platform::Zhihu,
            vec![
                Account::new(Platform::Zhihu, "z1", "Weekly Notes", Utc::now())
                    .with_description("Rust  \tDaily digest"),
            ],
        );

        let result = adapter.search_accounts("rust daily", 1, 10).await;
        assert_eq!(result.total(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn disabled_adapter_reports_unavailable(adapter: InMemoryPlatformAdapter) {
        let adapter = adapter.disabled();
        assert!(!adapter.is_enabled());
        assert!(!adapter.check_availability().await);
    }
}
