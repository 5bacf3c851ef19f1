//! Domain-level error type.
//!
//! Search operations only ever fail with [`ErrorCode::InvalidRequest`];
//! platform and cache faults are recorded as data on the results instead.
//! The binary renders errors through `color_eyre`, so the payload only needs
//! to serialise.

use serde::Serialize;

/// Failure category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Keyword, paging or identifier failed validation.
    InvalidRequest,
    /// A collaborator required for the call is down.
    ServiceUnavailable,
    /// Programmer error, such as a round with no adapters.
    InternalError,
}

impl ErrorCode {
    /// Text used when an error is raised with a blank message.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid request",
            Self::ServiceUnavailable => "service unavailable",
            Self::InternalError => "internal error",
        }
    }
}

/// Error returned by [`crate::domain::SearchService`] operations.
///
/// The message is never blank: constructors substitute
/// [`ErrorCode::default_message`].
///
/// # Examples
/// ```
/// use account_search::domain::{Error, ErrorCode};
///
/// let err = Error::invalid_request("page must be at least 1").for_field("page");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.field(), Some("page"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl Error {
    /// Error with `code` and `message`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            field: None,
        }
    }

    /// [`ErrorCode::InvalidRequest`] with `message`.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// [`ErrorCode::ServiceUnavailable`] with `message`.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// [`ErrorCode::InternalError`] with `message`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Name the request field that was rejected.
    #[must_use]
    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Rejected request field, when known.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(ErrorCode::InvalidRequest, "invalid request")]
    #[case(ErrorCode::ServiceUnavailable, "service unavailable")]
    #[case(ErrorCode::InternalError, "internal error")]
    fn blank_messages_fall_back_to_the_code(#[case] code: ErrorCode, #[case] expected: &str) {
        assert_eq!(Error::new(code, " \t").message(), expected);
    }

    #[rstest]
    fn display_is_the_message() {
        let err = Error::internal("no adapters supplied");
        assert_eq!(err.to_string(), "no adapters supplied");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn serialises_code_and_field() {
        let err = Error::invalid_request("page size out of range").for_field("pageSize");
        let value = serde_json::to_value(&err).expect("serialise error");
        assert_eq!(
            value,
            json!({
                "code": "invalid_request",
                "message": "page size out of range",
                "field": "pageSize"
            })
        );
    }

    #[rstest]
    fn field_is_omitted_when_unset() {
        let value =
            serde_json::to_value(Error::service_unavailable("down")).expect("serialise error");
        assert_eq!(value, json!({ "code": "service_unavailable", "message": "down" }));
    }
}
