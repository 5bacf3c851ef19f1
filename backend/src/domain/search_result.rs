//! Result values produced by adapters, the aggregator, and the service.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Account, Platform, SearchQuery};

/// Why a platform contributed nothing to a search.
///
/// Serialised in kebab-case (`"rate-limited"`, `"timeout"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    /// The adapter is switched off.
    PlatformDisabled,
    /// The platform answered with an error.
    PlatformApiError,
    /// No answer before the aggregation deadline.
    Timeout,
    /// The platform throttled the request.
    RateLimited,
    /// Credentials were missing or rejected.
    AuthenticationFailed,
    /// The platform's payload could not be decoded.
    DataParsingError,
    /// A usage quota is exhausted.
    QuotaExceeded,
    /// The result cache could not be reached. Never surfaced to callers.
    CacheUnavailable,
}

impl FailureReason {
    /// Stable kebab-case identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlatformDisabled => "platform-disabled",
            Self::PlatformApiError => "platform-api-error",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate-limited",
            Self::AuthenticationFailed => "authentication-failed",
            Self::DataParsingError => "data-parsing-error",
            Self::QuotaExceeded => "quota-exceeded",
            Self::CacheUnavailable => "cache-unavailable",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One adapter's answer to one search call.
///
/// Immutable once built: failures are encoded as `success == false` with a
/// reason and message rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSearchResult {
    platform: Platform,
    accounts: Vec<Account>,
    total: u64,
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure_reason: Option<FailureReason>,
}

impl PlatformSearchResult {
    /// A successful page of accounts; `total` is the platform-reported count.
    pub fn succeeded(platform: Platform, accounts: Vec<Account>, total: u64) -> Self {
        Self {
            platform,
            accounts,
            total,
            success: true,
            error_message: None,
            failure_reason: None,
        }
    }

    /// A failed call contributing no accounts.
    pub fn failed(platform: Platform, reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            platform,
            accounts: Vec::new(),
            total: 0,
            success: false,
            error_message: Some(message.into()),
            failure_reason: Some(reason),
        }
    }

    /// Platform that produced the result.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Accounts on this page.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Platform-reported total match count.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Failure description, if the call failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Failure category, if the call failed.
    pub fn failure_reason(&self) -> Option<FailureReason> {
        self.failure_reason
    }

    /// Consume the result, yielding its accounts.
    pub fn into_accounts(self) -> Vec<Account> {
        self.accounts
    }
}

/// A platform that did not contribute to an aggregation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformFailure {
    /// Failed platform.
    pub platform: Platform,
    /// Failure category.
    pub reason: FailureReason,
    /// Human-readable detail.
    pub message: String,
}

/// Per-round bookkeeping exposed to monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationOutcome {
    /// Number of platforms that answered successfully.
    pub successful_platforms: usize,
    /// Platforms that were skipped, failed, or timed out.
    pub failed_platforms: Vec<PlatformFailure>,
    /// Whether the result was served from cache without an aggregation round.
    #[serde(default)]
    pub cache_hit: bool,
}

impl AggregationOutcome {
    /// Outcome reported for results served from cache.
    pub fn from_cache() -> Self {
        Self {
            cache_hit: true,
            ..Self::default()
        }
    }

    /// Number of platforms considered in the round.
    pub fn platforms_considered(&self) -> usize {
        self.successful_platforms + self.failed_platforms.len()
    }

    /// Whether at least one platform failed to contribute.
    pub fn is_degraded(&self) -> bool {
        !self.failed_platforms.is_empty()
    }

    /// Failure reason recorded for `platform`, if any.
    pub fn failure_for(&self, platform: Platform) -> Option<FailureReason> {
        self.failed_platforms
            .iter()
            .find(|failure| failure.platform == platform)
            .map(|failure| failure.reason)
    }
}

/// The externally visible page of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Accounts on the requested page.
    pub accounts: Vec<Account>,
    /// Total matches across all pages.
    pub total: u64,
    /// One-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Set only for single-platform searches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Whether further pages exist.
    pub has_more: bool,
    /// Wall time spent producing the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_time_ms: Option<u64>,
    /// False only when a single-platform search could not reach its platform.
    #[serde(default = "default_success")]
    pub success: bool,
    /// Reason accompanying `success == false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

const fn default_success() -> bool {
    true
}

impl SearchResult {
    /// An empty, successful page.
    pub fn empty(query: &SearchQuery) -> Self {
        Self {
            accounts: Vec::new(),
            total: 0,
            page: query.page(),
            page_size: query.page_size(),
            platform: None,
            has_more: false,
            search_time_ms: None,
            success: true,
            error_message: None,
        }
    }

    /// An empty page flagged as unsuccessful.
    pub fn unavailable(
        query: &SearchQuery,
        platform: Option<Platform>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            success: false,
            error_message: Some(message.into()),
            ..Self::empty(query)
        }
    }

    /// Present one adapter's page as a single-platform search result.
    ///
    /// The adapter already paginated, so accounts are kept in its order.
    pub fn from_platform_result(result: PlatformSearchResult, query: &SearchQuery) -> Self {
        let platform = result.platform();
        let total = result.total();
        let success = result.is_success();
        let error_message = result.error_message().map(str::to_owned);
        Self {
            accounts: result.into_accounts(),
            total,
            page: query.page(),
            page_size: query.page_size(),
            platform: Some(platform),
            has_more: query.has_more(total),
            search_time_ms: None,
            success,
            error_message,
        }
    }

    /// Attach the elapsed search time.
    #[must_use]
    pub fn with_search_time_ms(mut self, elapsed_ms: u64) -> Self {
        self.search_time_ms = Some(elapsed_ms);
        self
    }
}
