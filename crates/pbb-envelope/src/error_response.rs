// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structured, transport-facing error values.

use std::collections::BTreeMap;
use std::fmt;

use pbb_error::{ErrorCategory, ErrorCode, PlatformError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// ErrorCodeResponse
// ---------------------------------------------------------------------------

/// Semantic, stable error code as it travels over a boundary.
///
/// A plain string wrapper with value equality. Codes produced by this
/// workspace always come from the [`ErrorCode`] catalog, but responses
/// received from other services may carry codes it does not know; see
/// [`ErrorCodeResponse::known_code`].
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ErrorCodeResponse(String);

impl ErrorCodeResponse {
    /// Wrap an arbitrary code string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The wrapped string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Catalog entry for this code, if it is one.
    pub fn known_code(&self) -> Option<ErrorCode> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ErrorCodeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ErrorCode> for ErrorCodeResponse {
    fn from(code: ErrorCode) -> Self {
        Self(code.as_str().to_string())
    }
}

impl From<&str> for ErrorCodeResponse {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ErrorCodeResponse {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<ErrorCode> for ErrorCodeResponse {
    fn eq(&self, other: &ErrorCode) -> bool {
        self.0 == other.as_str()
    }
}

// ---------------------------------------------------------------------------
// ErrorResponse
// ---------------------------------------------------------------------------

/// Structured error returned by a platform operation.
///
/// Carries only what a caller may see: code, message, category and the
/// declared metadata. Causes and stack traces never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse {
    /// Stable error code.
    pub code: ErrorCodeResponse,
    /// Human-readable message.
    pub message: String,
    /// Coarse failure class.
    pub category: ErrorCategory,
    /// Structured context, when the boundary chose to expose it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl ErrorResponse {
    /// Build a response with no metadata.
    pub fn new(
        code: impl Into<ErrorCodeResponse>,
        message: impl Into<String>,
        category: ErrorCategory,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            category,
            metadata: None,
        }
    }

    /// Replace the metadata with a copy of `metadata`.
    #[must_use]
    pub fn with_metadata<K, V>(mut self, metadata: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.metadata = Some(
            metadata
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Convert a caught error, copying all of its metadata.
    ///
    /// The error's cause is dropped.
    pub fn from_error(err: &PlatformError) -> Self {
        Self::without_metadata(err).with_metadata(err.metadata().clone())
    }

    /// Convert a caught error, exposing code, message and category only.
    pub fn without_metadata(err: &PlatformError) -> Self {
        Self::new(err.code(), err.message(), err.category())
    }

    /// Whether the code is a known retryable catalog entry.
    ///
    /// Unknown codes are never considered retryable.
    pub fn is_retryable(&self) -> bool {
        self.code.known_code().is_some_and(|c| c.is_retryable())
    }
}

impl From<&PlatformError> for ErrorResponse {
    fn from(err: &PlatformError) -> Self {
        Self::from_error(err)
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;

    #[test]
    fn code_equality_is_by_value() {
        assert_eq!(ErrorCodeResponse::new("X"), ErrorCodeResponse::from("X"));
        assert_ne!(ErrorCodeResponse::new("X"), ErrorCodeResponse::new("Y"));
    }

    #[test]
    fn code_display_is_raw_string() {
        assert_eq!(ErrorCodeResponse::new("ORDER_LOCKED").to_string(), "ORDER_LOCKED");
    }

    #[test]
    fn code_serializes_transparently() {
        let json = serde_json::to_string(&ErrorCodeResponse::new("A_B")).unwrap();
        assert_eq!(json, r#""A_B""#);
    }

    #[test]
    fn known_code_lookup() {
        let code = ErrorCodeResponse::from(ErrorCode::ServiceUnavailable);
        assert_eq!(code.known_code(), Some(ErrorCode::ServiceUnavailable));
        assert_eq!(code, ErrorCode::ServiceUnavailable);
        assert_eq!(ErrorCodeResponse::new("LEGACY_42").known_code(), None);
    }

    #[test]
    fn from_error_copies_fields() {
        let err = PlatformError::not_found("Order", "123");
        let resp = ErrorResponse::from_error(&err);
        assert_eq!(resp.code.as_str(), "RESOURCE_NOT_FOUND");
        assert_eq!(resp.message, err.message());
        assert_eq!(resp.category, ErrorCategory::NotFound);
        assert_eq!(
            resp.metadata,
            Some(BTreeMap::from([
                ("resourceIdentifier".to_string(), json!("123")),
                ("resourceType".to_string(), json!("Order")),
            ]))
        );
    }

    #[test]
    fn cause_never_crosses_boundary() {
        let err = PlatformError::unexpected(io::Error::other("secret stack detail"));
        let json = serde_json::to_string(&ErrorResponse::from(&err)).unwrap();
        assert!(!json.contains("secret stack detail"));
    }

    #[test]
    fn without_metadata_omits_field_in_json() {
        let err = PlatformError::unauthorized("anonymous");
        let json = serde_json::to_value(ErrorResponse::without_metadata(&err)).unwrap();
        assert!(json.get("metadata").is_none());
        assert_eq!(json["category"], json!("security"));
    }

    #[test]
    fn retryable_follows_catalog() {
        let err = PlatformError::rate_limit_exceeded("global");
        assert!(ErrorResponse::from(&err).is_retryable());
        let err = PlatformError::validation("x", "y");
        assert!(!ErrorResponse::from(&err).is_retryable());
        let foreign = ErrorResponse::new("SOMETHING_ELSE", "m", ErrorCategory::Unavailable);
        assert!(!foreign.is_retryable());
    }
}
