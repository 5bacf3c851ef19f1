//! Content platforms hosting searchable accounts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External content platform identifier.
///
/// Serialised as the lowercase platform id (`"weibo"`, `"wechat"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// WeChat official accounts.
    Wechat,
    /// Sina Weibo.
    Weibo,
    /// Twitter / X.
    Twitter,
    /// Douyin short video.
    Douyin,
    /// Zhihu Q&A.
    Zhihu,
    /// Bilibili video.
    Bilibili,
    /// Xiaohongshu (RED).
    Xiaohongshu,
}

impl Platform {
    /// Every known platform, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Wechat,
        Self::Weibo,
        Self::Twitter,
        Self::Douyin,
        Self::Zhihu,
        Self::Bilibili,
        Self::Xiaohongshu,
    ];

    /// Stable lowercase identifier used in keys and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wechat => "wechat",
            Self::Weibo => "weibo",
            Self::Twitter => "twitter",
            Self::Douyin => "douyin",
            Self::Zhihu => "zhihu",
            Self::Bilibili => "bilibili",
            Self::Xiaohongshu => "xiaohongshu",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a platform id does not name a known platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatformError(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPlatformError(value.to_owned()))
    }
}
