//! DTOs for decoding raw platform account payloads.
//!
//! Platforms disagree on field names, so each field accepts the spellings
//! seen in the wild. Records decode into these DTOs first, then map into
//! domain [`Account`]s in one pass. Unrecognised fields are kept as details.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Account, Platform, VERIFIED_DETAIL_KEY};

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponseDto {
    #[serde(default, alias = "items", alias = "results", alias = "list")]
    pub(super) accounts: Vec<Value>,
    #[serde(default, alias = "totalCount", alias = "total_count")]
    pub(super) total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawAccountRecord {
    #[serde(
        alias = "platformAccountId",
        alias = "platform_account_id",
        alias = "accountId",
        alias = "uid"
    )]
    id: Value,
    #[serde(alias = "nickname", alias = "screen_name", alias = "displayName")]
    name: String,
    #[serde(
        default,
        alias = "avatar",
        alias = "avatarUrl",
        alias = "profile_image_url"
    )]
    avatar_url: Option<String>,
    #[serde(default, alias = "bio", alias = "signature", alias = "desc")]
    description: Option<String>,
    #[serde(
        default,
        alias = "followers",
        alias = "followerCount",
        alias = "followers_count",
        alias = "fans"
    )]
    follower_count: Option<u64>,
    #[serde(default)]
    verified: Option<Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl RawAccountRecord {
    pub(super) fn from_value(raw: &Value) -> Result<Self, String> {
        Self::deserialize(raw).map_err(|error| format!("malformed account record: {error}"))
    }

    pub(super) fn into_account(
        self,
        platform: Platform,
        observed_at: DateTime<Utc>,
    ) -> Result<Account, String> {
        let platform_account_id = match self.id {
            Value::String(id) if !id.trim().is_empty() => id.trim().to_owned(),
            Value::Number(id) => id.to_string(),
            other => return Err(format!("account id must be a string or number, got {other}")),
        };
        let name = self.name.trim();
        if name.is_empty() {
            return Err(format!("account {platform_account_id} has a blank name"));
        }

        let mut account = Account::new(platform, platform_account_id, name, observed_at)
            .with_avatar_url(self.avatar_url.unwrap_or_default())
            .with_description(self.description.unwrap_or_default())
            .with_follower_count(self.follower_count.unwrap_or_default());
        if let Some(verified) = self.verified {
            account = account.with_detail(VERIFIED_DETAIL_KEY, verified);
        }
        for (key, value) in self.extra {
            account = account.with_detail(key, value);
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn aliased_fields_are_accepted() {
        let raw = json!({
            "uid": 1_001,
            "screen_name": " 科技达人 ",
            "profile_image_url": "https://img.example/1.png",
            "bio": "daily tech",
            "followers_count": 2_000,
            "verified": "1",
            "location": "Shenzhen"
        });

        let account = RawAccountRecord::from_value(&raw)
            .and_then(|record| record.into_account(Platform::Weibo, Utc::now()))
            .expect("record maps");

        assert_eq!(account.platform_account_id, "1001");
        assert_eq!(account.name, "科技达人");
        assert_eq!(account.avatar_url, "https://img.example/1.png");
        assert_eq!(account.follower_count, 2_000);
        assert!(account.is_verified());
        assert_eq!(account.details.get("location"), Some(&json!("Shenzhen")));
    }

    #[rstest]
    #[case(json!({ "name": "nobody" }))]
    #[case(json!({ "id": "", "name": "blank id" }))]
    #[case(json!({ "id": "7", "name": "   " }))]
    #[case(json!({ "id": ["7"], "name": "array id" }))]
    fn malformed_records_are_rejected(#[case] raw: Value) {
        let mapped = RawAccountRecord::from_value(&raw)
            .and_then(|record| record.into_account(Platform::Zhihu, Utc::now()));
        assert!(mapped.is_err());
    }
}
