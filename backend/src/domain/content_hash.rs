//! Canonical JSON hashing used to derive cache keys.

use std::fmt;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of digest bytes kept for cache keys (128 bits).
pub const SHORT_HASH_BYTES: usize = 16;

/// Failure to serialise the canonical payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to serialise canonical JSON payload: {message}")]
pub struct ContentHashError {
    /// Serializer message.
    pub message: String,
}

/// SHA-256 digest of a canonicalised JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex of the full digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Lowercase hex of the leading [`SHORT_HASH_BYTES`] bytes.
    ///
    /// # Examples
    /// ```
    /// use account_search::domain::canonicalize_and_hash;
    /// use serde_json::json;
    ///
    /// let hash = canonicalize_and_hash(&json!({ "keyword": "rust" })).expect("hash");
    /// assert_eq!(hash.short_hex().len(), 32);
    /// ```
    pub fn short_hex(&self) -> String {
        let (short, _) = self.0.split_at(SHORT_HASH_BYTES);
        hex::encode(short)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Canonicalise a JSON value and compute its SHA-256 hash.
///
/// Object keys are sorted recursively, arrays keep their order, and the
/// result is serialised compactly before hashing, so logically equal
/// payloads hash identically regardless of key insertion order.
///
/// # Errors
///
/// Returns [`ContentHashError`] if the canonical value cannot be serialised.
///
/// # Examples
/// ```
/// use account_search::domain::canonicalize_and_hash;
/// use serde_json::json;
///
/// let a = canonicalize_and_hash(&json!({ "page": 1, "keyword": "rust" })).expect("hash a");
/// let b = canonicalize_and_hash(&json!({ "keyword": "rust", "page": 1 })).expect("hash b");
/// assert_eq!(a, b);
/// ```
pub fn canonicalize_and_hash(value: &serde_json::Value) -> Result<ContentHash, ContentHashError> {
    let canonical = canonicalize(value);
    let bytes = serde_json::to_vec(&canonical).map_err(|err| ContentHashError {
        message: err.to_string(),
    })?;
    Ok(ContentHash(Sha256::digest(&bytes).into()))
}

fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by_key(|(key, _)| key.as_str());
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(key, nested)| (key.clone(), canonicalize(nested)))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn nested_key_order_does_not_affect_hash() {
        let a = json!({ "outer": { "b": 1, "a": [ { "y": 2, "x": 1 } ] } });
        let b = json!({ "outer": { "a": [ { "x": 1, "y": 2 } ], "b": 1 } });
        assert_eq!(
            canonicalize_and_hash(&a).expect("hash a"),
            canonicalize_and_hash(&b).expect("hash b")
        );
    }

    #[rstest]
    fn array_order_is_significant() {
        let a = canonicalize_and_hash(&json!(["weibo", "wechat"])).expect("hash a");
        let b = canonicalize_and_hash(&json!(["wechat", "weibo"])).expect("hash b");
        assert_ne!(a, b);
    }

    #[rstest]
    fn hex_encodings_have_expected_lengths() {
        let hash = canonicalize_and_hash(&json!({})).expect("hash");
        assert_eq!(hash.to_hex().len(), 64);
        assert_eq!(hash.short_hex().len(), SHORT_HASH_BYTES * 2);
        assert!(hash.to_hex().starts_with(&hash.short_hex()));
    }
}
