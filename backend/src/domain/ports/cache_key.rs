//! Cache keys and namespaces shared by cache store adapters.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cache tier, each with its own TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheNamespace {
    /// Merged multi-platform search results.
    Aggregate,
    /// Single-platform search results.
    Platform,
    /// Single account lookups.
    Account,
    /// Platform availability checks.
    PlatformStatus,
}

impl CacheNamespace {
    /// Every namespace, in reporting order.
    pub const ALL: [Self; 4] = [
        Self::Aggregate,
        Self::Platform,
        Self::Account,
        Self::PlatformStatus,
    ];

    /// Key segment naming the namespace.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggregate => "aggregate",
            Self::Platform => "platform",
            Self::Account => "account",
            Self::PlatformStatus => "platform_status",
        }
    }
}

impl fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown namespace name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cache namespace: {0}")]
pub struct UnknownCacheNamespaceError(pub String);

impl FromStr for CacheNamespace {
    type Err = UnknownCacheNamespaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|namespace| namespace.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownCacheNamespaceError(value.to_owned()))
    }
}

/// Cache key used to store and retrieve serialised search payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a cache key after validating that it is non-empty and trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheKeyValidationError`] for blank or padded keys.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("cache key must not be empty")]
    Empty,
    /// Key contains leading or trailing whitespace.
    #[error("cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}

#[cfg(test)]
mod tests {
    //! Validates cache key parsing and namespace names.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn cache_key_rejects_blank(#[case] value: &str) {
        let err = CacheKey::new(value).expect_err("blank keys rejected");
        assert_eq!(err, CacheKeyValidationError::Empty);
    }

    #[rstest]
    #[case(" leading")]
    #[case("trailing ")]
    fn cache_key_rejects_whitespace_padding(#[case] value: &str) {
        let err = CacheKey::new(value).expect_err("padded key rejected");
        assert_eq!(err, CacheKeyValidationError::ContainsWhitespace);
    }

    #[rstest]
    fn cache_key_accepts_clean_input() {
        let key = CacheKey::new("account_search:account:weibo:1").expect("valid key");
        assert_eq!(key.as_str(), "account_search:account:weibo:1");
        assert_eq!(key.to_string(), "account_search:account:weibo:1");
    }

    #[rstest]
    #[case("aggregate", CacheNamespace::Aggregate)]
    #[case("platform-status", CacheNamespace::PlatformStatus)]
    #[case("PLATFORM_STATUS", CacheNamespace::PlatformStatus)]
    #[case(" account ", CacheNamespace::Account)]
    fn namespaces_parse_from_names(#[case] raw: &str, #[case] expected: CacheNamespace) {
        assert_eq!(raw.parse::<CacheNamespace>(), Ok(expected));
    }

    #[rstest]
    fn unknown_namespace_is_rejected() {
        assert!("queue".parse::<CacheNamespace>().is_err());
    }
}
