//! Reqwest-backed platform adapter for JSON search gateways.
//!
//! Each platform sits behind a gateway exposing
//! `GET {base}/search?keyword=&page=&pageSize=` and
//! `GET {base}/accounts/{id}`. This adapter owns transport details only:
//! URL construction, status mapping and JSON decoding into domain accounts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use super::dto::{RawAccountRecord, SearchResponseDto};
use crate::domain::ports::{PlatformAdapter, PlatformAdapterError};
use crate::domain::{Account, Platform, PlatformSearchResult};

const DEFAULT_USER_AGENT: &str = "account-search/0.1";

/// [`PlatformAdapter`] calling one platform's HTTP gateway.
pub struct HttpPlatformAdapter {
    platform: Platform,
    display_name: String,
    client: Client,
    base_url: Url,
    enabled: bool,
    clock: Arc<dyn Clock>,
}

impl HttpPlatformAdapter {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(platform: Platform, base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            platform,
            display_name: platform.as_str().to_owned(),
            client,
            base_url,
            enabled: true,
            clock: Arc::new(DefaultClock),
        })
    }

    /// Override the human-readable name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Mark the adapter as switched off.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn fetch_page(
        &self,
        keyword: &str,
        page: u32,
        page_size: u32,
    ) -> Result<PlatformSearchResult, PlatformAdapterError> {
        let mut url = endpoint(&self.base_url, &["search"])?;
        url.query_pairs_mut()
            .append_pair("keyword", keyword)
            .append_pair("page", &page.to_string())
            .append_pair("pageSize", &page_size.to_string());

        let body = self.get_json(url).await?;
        let decoded: SearchResponseDto = serde_json::from_slice(&body).map_err(|error| {
            PlatformAdapterError::data_parsing(format!("invalid search payload: {error}"))
        })?;

        let mut accounts = Vec::with_capacity(decoded.accounts.len());
        for raw in &decoded.accounts {
            match self.normalize_account_data(raw) {
                Ok(account) => accounts.push(account),
                Err(error) => warn!(platform = %self.platform, error = %error, "skipping malformed account record"),
            }
        }
        let total = decoded
            .total
            .unwrap_or_else(|| u64::try_from(accounts.len()).unwrap_or(u64::MAX));
        Ok(PlatformSearchResult::succeeded(self.platform, accounts, total))
    }

    async fn get_json(&self, url: Url) -> Result<Vec<u8>, PlatformAdapterError> {
        let (status, body) = self.send(url).await?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        Ok(body)
    }

    async fn send(&self, url: Url) -> Result<(StatusCode, Vec<u8>), PlatformAdapterError> {
        debug!(platform = %self.platform, url = %url, "platform request");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl PlatformAdapter for HttpPlatformAdapter {
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
        match self.fetch_page(keyword, page, page_size).await {
            Ok(result) => result,
            Err(error) => error.into_search_result(self.platform),
        }
    }

    async fn get_account_info(
        &self,
        account_id: &str,
    ) -> Result<Option<Account>, PlatformAdapterError> {
        let url = endpoint(&self.base_url, &["accounts", account_id])?;
        let (status, body) = self.send(url).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        let raw: Value = serde_json::from_slice(&body).map_err(|error| {
            PlatformAdapterError::data_parsing(format!("invalid account payload: {error}"))
        })?;
        let record = raw.get("account").unwrap_or(&raw);
        self.normalize_account_data(record).map(Some)
    }

    fn normalize_account_data(&self, raw: &Value) -> Result<Account, PlatformAdapterError> {
        RawAccountRecord::from_value(raw)
            .and_then(|record| record.into_account(self.platform, self.clock.utc()))
            .map_err(PlatformAdapterError::data_parsing)
    }
}

/// Append path `segments` to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, PlatformAdapterError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| PlatformAdapterError::api(format!("base url {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn map_transport_error(error: reqwest::Error) -> PlatformAdapterError {
    if error.is_timeout() {
        PlatformAdapterError::timeout(error.to_string())
    } else if error.is_decode() {
        PlatformAdapterError::data_parsing(error.to_string())
    } else {
        PlatformAdapterError::api(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PlatformAdapterError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PlatformAdapterError::authentication_failed(message)
        }
        StatusCode::TOO_MANY_REQUESTS => PlatformAdapterError::rate_limited(message),
        StatusCode::PAYMENT_REQUIRED => PlatformAdapterError::quota_exceeded(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PlatformAdapterError::timeout(message)
        }
        _ => PlatformAdapterError::api(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use crate::domain::FailureReason;
    use rstest::rstest;

    fn base(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[rstest]
    #[case("https://gw.example/weibo", &["search"], "https://gw.example/weibo/search")]
    #[case("https://gw.example/weibo/", &["search"], "https://gw.example/weibo/search")]
    #[case(
        "https://gw.example/",
        &["accounts", "a/b c"],
        "https://gw.example/accounts/a%2Fb%20c"
    )]
    fn endpoints_append_encoded_segments(
        #[case] raw: &str,
        #[case] segments: &[&str],
        #[case] expected: &str,
    ) {
        let url = endpoint(&base(raw), segments).expect("endpoint builds");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn cannot_be_base_urls_are_rejected() {
        let err = endpoint(&base("mailto:ops@example.com"), &["search"])
            .expect_err("mailto cannot carry a path");
        assert_eq!(err.reason(), FailureReason::PlatformApiError);
    }

    #[rstest]
    #[case::unauthorised(StatusCode::UNAUTHORIZED, FailureReason::AuthenticationFailed)]
    #[case::forbidden(StatusCode::FORBIDDEN, FailureReason::AuthenticationFailed)]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, FailureReason::RateLimited)]
    #[case::quota(StatusCode::PAYMENT_REQUIRED, FailureReason::QuotaExceeded)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, FailureReason::Timeout)]
    #[case::not_found(StatusCode::NOT_FOUND, FailureReason::PlatformApiError)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, FailureReason::PlatformApiError)]
    fn maps_http_statuses_to_failure_reasons(
        #[case] status: StatusCode,
        #[case] expected: FailureReason,
    ) {
        let error = map_status_error(status, b"{\"error\": \"nope\"}");
        assert_eq!(error.reason(), expected);
        assert!(error.to_string().contains(&status.as_u16().to_string()));
    }

    #[rstest]
    fn long_bodies_are_truncated_in_messages() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    fn search_payloads_decode_with_aliases() {
        let body = br#"{ "items": [ { "id": "1", "name": "a" } ], "totalCount": 40 }"#;
        let decoded: SearchResponseDto = serde_json::from_slice(body).expect("decodes");
        assert_eq!(decoded.accounts.len(), 1);
        assert_eq!(decoded.total, Some(40));
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_gateway_fails_as_data() {
        let adapter = HttpPlatformAdapter::new(
            Platform::Douyin,
            base("http://127.0.0.1:9"),
            Duration::from_millis(200),
        )
        .expect("client builds");

        let result = adapter.search_accounts("科技", 1, 10).await;
        assert!(!result.is_success());
        assert!(result.accounts().is_empty());
    }
}
