//! Driven port for searching one external content platform.
//!
//! Adapters own crawling and transport. The domain owns the result contract:
//! ordinary failures come back as data inside [`PlatformSearchResult`], never
//! as panics or errors, so one misbehaving platform cannot abort a search.

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;
use crate::domain::{Account, FailureReason, Platform, PlatformSearchResult};

define_port_error! {
    /// Errors an adapter may report for lookups and normalisation.
    pub enum PlatformAdapterError {
        /// Adapter is switched off.
        Disabled { message: String } => "platform disabled: {message}",
        /// Platform answered with an error status.
        Api { message: String } => "platform api error: {message}",
        /// Platform did not answer in time.
        Timeout { message: String } => "platform timeout: {message}",
        /// Platform throttled the caller.
        RateLimited { message: String } => "platform rate limited request: {message}",
        /// Credentials missing or rejected.
        AuthenticationFailed { message: String } =>
            "platform authentication failed: {message}",
        /// Payload could not be decoded into accounts.
        DataParsing { message: String } => "platform data parsing failed: {message}",
        /// Usage quota is exhausted.
        QuotaExceeded { message: String } => "platform quota exceeded: {message}",
    }
}

impl PlatformAdapterError {
    /// Failure category recorded in search results.
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Disabled { .. } => FailureReason::PlatformDisabled,
            Self::Api { .. } => FailureReason::PlatformApiError,
            Self::Timeout { .. } => FailureReason::Timeout,
            Self::RateLimited { .. } => FailureReason::RateLimited,
            Self::AuthenticationFailed { .. } => FailureReason::AuthenticationFailed,
            Self::DataParsing { .. } => FailureReason::DataParsingError,
            Self::QuotaExceeded { .. } => FailureReason::QuotaExceeded,
        }
    }

    /// Encode this error as a failed search result for `platform`.
    pub fn into_search_result(self, platform: Platform) -> PlatformSearchResult {
        PlatformSearchResult::failed(platform, self.reason(), self.to_string())
    }
}

/// Capability set every platform integration provides.
///
/// Implementations must be safe to call concurrently; the aggregator issues
/// one call per adapter per round and enforces its own deadline regardless of
/// how long an adapter takes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Platform served by this adapter.
    fn platform_id(&self) -> Platform;

    /// Human-readable platform name.
    fn display_name(&self) -> String;

    /// Whether the adapter may be called. Disabled adapters are skipped.
    fn is_enabled(&self) -> bool;

    /// Search accounts matching `keyword`, returning one page.
    ///
    /// Failures are encoded as `success == false` with a reason.
    async fn search_accounts(&self, keyword: &str, page: u32, page_size: u32)
    -> PlatformSearchResult;

    /// Fetch one account by its platform-native id.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformAdapterError`] when the platform cannot be queried.
    async fn get_account_info(&self, account_id: &str)
    -> Result<Option<Account>, PlatformAdapterError>;

    /// Convert one raw platform record into an [`Account`].
    ///
    /// # Errors
    ///
    /// Returns [`PlatformAdapterError::DataParsing`] for malformed records.
    fn normalize_account_data(&self, raw: &Value) -> Result<Account, PlatformAdapterError>;

    /// Check whether the platform is currently reachable.
    ///
    /// Defaults to [`PlatformAdapter::is_enabled`].
    async fn check_availability(&self) -> bool {
        self.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PlatformAdapterError::disabled("off"), FailureReason::PlatformDisabled)]
    #[case(PlatformAdapterError::api("500"), FailureReason::PlatformApiError)]
    #[case(PlatformAdapterError::timeout("slow"), FailureReason::Timeout)]
    #[case(PlatformAdapterError::rate_limited("429"), FailureReason::RateLimited)]
    #[case(
        PlatformAdapterError::authentication_failed("401"),
        FailureReason::AuthenticationFailed
    )]
    #[case(PlatformAdapterError::data_parsing("bad json"), FailureReason::DataParsingError)]
    #[case(PlatformAdapterError::quota_exceeded("daily"), FailureReason::QuotaExceeded)]
    fn errors_map_to_failure_reasons(
        #[case] error: PlatformAdapterError,
        #[case] expected: FailureReason,
    ) {
        assert_eq!(error.reason(), expected);
    }

    #[rstest]
    fn errors_encode_as_failed_results() {
        let result = PlatformAdapterError::rate_limited("retry later")
            .into_search_result(Platform::Bilibili);
        assert!(!result.is_success());
        assert_eq!(result.platform(), Platform::Bilibili);
        assert_eq!(result.failure_reason(), Some(FailureReason::RateLimited));
        assert_eq!(
            result.error_message(),
            Some("platform rate limited request: retry later")
        );
    }
}
