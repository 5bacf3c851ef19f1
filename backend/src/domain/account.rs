//! Canonical account record returned by platform adapters.
//!
//! Accounts are ephemeral DTOs rebuilt on every adapter call. Merge and
//! ranking code builds new vectors from them and never edits one in place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::Platform;

/// Key inside [`Account::details`] carrying the platform's verification flag.
pub const VERIFIED_DETAIL_KEY: &str = "verified";

/// A blogger or creator listed on one platform.
///
/// `(platform, platform_account_id)` identifies the account; the same
/// display name may legitimately appear on several platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque identifier, platform-local or synthesised.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hosting platform.
    pub platform: Platform,
    /// Platform-native identifier, unique within `platform`.
    pub platform_account_id: String,
    /// Avatar image URL; empty when the platform has none.
    #[serde(default)]
    pub avatar_url: String,
    /// Free-form profile description.
    #[serde(default)]
    pub description: String,
    /// Follower count reported by the platform.
    #[serde(default)]
    pub follower_count: u64,
    /// Platform-specific metadata such as the verified flag.
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
    /// When the record was first observed.
    pub created_at: DateTime<Utc>,
    /// When the record was last refreshed.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Build an account with a synthesised id and empty optional fields.
    ///
    /// # Examples
    /// ```
    /// use account_search::domain::{Account, Platform};
    /// use chrono::Utc;
    ///
    /// let account = Account::new(Platform::Weibo, "1001", "科技达人", Utc::now())
    ///     .with_follower_count(2_000)
    ///     .with_verified(true);
    /// assert!(account.is_verified());
    /// assert_eq!(account.id, Account::synthesize_id(Platform::Weibo, "1001"));
    /// ```
    pub fn new(
        platform: Platform,
        platform_account_id: impl Into<String>,
        name: impl Into<String>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        let platform_account_id = platform_account_id.into();
        Self {
            id: Self::synthesize_id(platform, &platform_account_id),
            name: name.into(),
            platform,
            platform_account_id,
            avatar_url: String::new(),
            description: String::new(),
            follower_count: 0,
            details: BTreeMap::new(),
            created_at: observed_at,
            updated_at: observed_at,
        }
    }

    /// Deterministic id for platforms that do not expose one of their own.
    pub fn synthesize_id(platform: Platform, platform_account_id: &str) -> String {
        let name = format!("{platform}:{platform_account_id}");
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the avatar URL.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = avatar_url.into();
        self
    }

    /// Set the follower count.
    #[must_use]
    pub fn with_follower_count(mut self, follower_count: u64) -> Self {
        self.follower_count = follower_count;
        self
    }

    /// Record the platform verification flag in `details`.
    #[must_use]
    pub fn with_verified(self, verified: bool) -> Self {
        self.with_detail(VERIFIED_DETAIL_KEY, Value::Bool(verified))
    }

    /// Insert one platform-specific detail.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Whether the platform marks this account as verified.
    ///
    /// Platforms disagree on the encoding, so booleans, `"true"`/`"1"`
    /// strings and the number `1` are all accepted.
    pub fn is_verified(&self) -> bool {
        match self.details.get(VERIFIED_DETAIL_KEY) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(raw)) => raw.eq_ignore_ascii_case("true") || raw == "1",
            Some(Value::Number(number)) => number.as_u64() == Some(1),
            _ => false,
        }
    }

    /// Name folded for duplicate detection.
    pub fn dedup_key(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Lowercase `name` and collapse internal whitespace runs to single spaces.
///
/// # Examples
/// ```
/// use account_search::domain::normalize_name;
///
/// assert_eq!(normalize_name("  Tech \t Daily "), "tech daily");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
