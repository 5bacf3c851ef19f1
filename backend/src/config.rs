//! Search settings loaded via OrthoConfig.
//!
//! Every field is optional; accessors fall back to the documented defaults.
//! Values come from `ACCOUNT_SEARCH_*` environment variables or a config file.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{
    CacheTtls, DEFAULT_AGGREGATE_TIMEOUT, DEFAULT_KEY_PREFIX, DEFAULT_LOOKUP_TIMEOUT, Platform,
    SearchServiceConfig,
};

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A `platform=url` entry could not be parsed.
    #[error("invalid platform endpoint `{entry}`: {reason}")]
    InvalidEndpoint {
        /// The offending entry.
        entry: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Configuration for the search service and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNT_SEARCH")]
pub struct SearchSettings {
    /// Shared deadline for one search round, in milliseconds.
    pub aggregate_timeout_ms: Option<u64>,
    /// Deadline for lookups and availability checks, in milliseconds.
    pub lookup_timeout_ms: Option<u64>,
    /// TTL for merged search results, in seconds.
    pub aggregate_ttl_secs: Option<u64>,
    /// TTL for single-platform results, in seconds.
    pub platform_ttl_secs: Option<u64>,
    /// TTL for account lookups, in seconds.
    pub account_ttl_secs: Option<u64>,
    /// TTL for availability checks, in seconds.
    pub platform_status_ttl_secs: Option<u64>,
    /// Redis URL; when unset an in-process cache is used.
    pub redis_url: Option<String>,
    /// Prefix applied to every cache key.
    pub key_prefix: Option<String>,
    /// Comma-separated `platform=base_url` gateway list.
    pub platform_endpoints: Option<String>,
}

fn positive_millis(value: Option<u64>, default: Duration) -> Duration {
    value
        .filter(|millis| *millis > 0)
        .map_or(default, Duration::from_millis)
}

fn positive_secs(value: Option<u64>, default: Duration) -> Duration {
    value
        .filter(|secs| *secs > 0)
        .map_or(default, Duration::from_secs)
}

impl SearchSettings {
    /// Aggregation deadline; zero or unset falls back to ten seconds.
    pub fn aggregate_timeout(&self) -> Duration {
        positive_millis(self.aggregate_timeout_ms, DEFAULT_AGGREGATE_TIMEOUT)
    }

    /// Lookup deadline; zero or unset falls back to five seconds.
    pub fn lookup_timeout(&self) -> Duration {
        positive_millis(self.lookup_timeout_ms, DEFAULT_LOOKUP_TIMEOUT)
    }

    /// Per-namespace cache TTLs.
    pub fn cache_ttls(&self) -> CacheTtls {
        let defaults = CacheTtls::default();
        CacheTtls {
            aggregate: positive_secs(self.aggregate_ttl_secs, defaults.aggregate),
            platform: positive_secs(self.platform_ttl_secs, defaults.platform),
            account: positive_secs(self.account_ttl_secs, defaults.account),
            platform_status: positive_secs(
                self.platform_status_ttl_secs,
                defaults.platform_status,
            ),
        }
    }

    /// Deadlines for the search service.
    pub fn service_config(&self) -> SearchServiceConfig {
        SearchServiceConfig {
            aggregate_timeout: self.aggregate_timeout(),
            lookup_timeout: self.lookup_timeout(),
        }
    }

    /// Cache key prefix, falling back to `account_search`.
    pub fn key_prefix(&self) -> &str {
        self.key_prefix
            .as_deref()
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or(DEFAULT_KEY_PREFIX)
    }

    /// Redis URL, if configured and non-blank.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Parsed gateway endpoints in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidEndpoint`] for entries that are not
    /// `platform=url` with a known platform and an absolute URL.
    pub fn platform_endpoints(&self) -> Result<Vec<(Platform, Url)>, SettingsError> {
        let Some(raw) = self.platform_endpoints.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_endpoint)
            .collect()
    }
}

fn parse_endpoint(entry: &str) -> Result<(Platform, Url), SettingsError> {
    let invalid = |reason: String| SettingsError::InvalidEndpoint {
        entry: entry.to_owned(),
        reason,
    };
    let (platform, url) = entry
        .split_once('=')
        .ok_or_else(|| invalid("expected platform=url".to_owned()))?;
    let platform = platform
        .parse::<Platform>()
        .map_err(|error| invalid(error.to_string()))?;
    let url = Url::parse(url.trim()).map_err(|error| invalid(error.to_string()))?;
    Ok((platform, url))
}

#[cfg(test)]
mod tests {
    //! Unit tests for search settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "ACCOUNT_SEARCH_AGGREGATE_TIMEOUT_MS",
        "ACCOUNT_SEARCH_LOOKUP_TIMEOUT_MS",
        "ACCOUNT_SEARCH_AGGREGATE_TTL_SECS",
        "ACCOUNT_SEARCH_PLATFORM_TTL_SECS",
        "ACCOUNT_SEARCH_ACCOUNT_TTL_SECS",
        "ACCOUNT_SEARCH_PLATFORM_STATUS_TTL_SECS",
        "ACCOUNT_SEARCH_REDIS_URL",
        "ACCOUNT_SEARCH_KEY_PREFIX",
        "ACCOUNT_SEARCH_PLATFORM_ENDPOINTS",
    ];

    fn load_from_empty_args() -> SearchSettings {
        SearchSettings::load_from_iter([OsString::from("account-search")])
            .expect("config should load")
    }

    fn unset() -> SearchSettings {
        SearchSettings {
            aggregate_timeout_ms: None,
            lookup_timeout_ms: None,
            aggregate_ttl_secs: None,
            platform_ttl_secs: None,
            account_ttl_secs: None,
            platform_status_ttl_secs: None,
            redis_url: None,
            key_prefix: None,
            platform_endpoints: None,
        }
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(settings.aggregate_timeout(), Duration::from_secs(10));
        assert_eq!(settings.lookup_timeout(), Duration::from_secs(5));
        assert_eq!(settings.cache_ttls(), CacheTtls::default());
        assert_eq!(settings.key_prefix(), "account_search");
        assert_eq!(settings.redis_url(), None);
        assert_eq!(settings.platform_endpoints(), Ok(Vec::new()));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("ACCOUNT_SEARCH_AGGREGATE_TIMEOUT_MS", "2500"),
            ("ACCOUNT_SEARCH_ACCOUNT_TTL_SECS", "90"),
            ("ACCOUNT_SEARCH_REDIS_URL", "redis://127.0.0.1:6379"),
            ("ACCOUNT_SEARCH_KEY_PREFIX", "staging"),
            (
                "ACCOUNT_SEARCH_PLATFORM_ENDPOINTS",
                "weibo=https://gw.example/weibo, zhihu=https://gw.example/zhihu",
            ),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.aggregate_timeout(), Duration::from_millis(2_500));
        assert_eq!(settings.cache_ttls().account, Duration::from_secs(90));
        assert_eq!(settings.cache_ttls().platform, Duration::from_secs(300));
        assert_eq!(settings.redis_url(), Some("redis://127.0.0.1:6379"));
        assert_eq!(settings.key_prefix(), "staging");

        let endpoints = settings.platform_endpoints().expect("endpoints parse");
        let platforms: Vec<_> = endpoints.iter().map(|(platform, _)| *platform).collect();
        assert_eq!(platforms, [Platform::Weibo, Platform::Zhihu]);
    }

    #[rstest]
    fn zero_durations_fall_back_to_defaults() {
        let settings = SearchSettings {
            aggregate_timeout_ms: Some(0),
            platform_status_ttl_secs: Some(0),
            ..unset()
        };
        assert_eq!(settings.aggregate_timeout(), DEFAULT_AGGREGATE_TIMEOUT);
        assert_eq!(settings.cache_ttls().platform_status, Duration::from_secs(60));
    }

    #[rstest]
    #[case("weibo")]
    #[case("myspace=https://gw.example")]
    #[case("weibo=not a url")]
    fn malformed_endpoints_are_rejected(#[case] raw: &str) {
        let settings = SearchSettings {
            platform_endpoints: Some(raw.to_owned()),
            ..unset()
        };
        assert!(matches!(
            settings.platform_endpoints(),
            Err(SettingsError::InvalidEndpoint { .. })
        ));
    }
}
