// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outbound operation envelope.
//!
//! A [`ResponseEnvelope`] is either successful (optionally with data) or
//! failed (with an [`ErrorResponse`]). The two shapes are built through
//! disjoint constructors, so no value can carry both data and an error, or
//! report failure without saying why.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ErrorResponse;

/// Reasons a serialised response is rejected on decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// `success` is true but an error is present.
    #[error("successful response must not carry an error")]
    SuccessWithError,
    /// `success` is false but data is present.
    #[error("failed response must not carry data")]
    FailureWithData,
    /// `success` is false and no error is present.
    #[error("failed response must carry an error")]
    FailureWithoutError,
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome<T> {
    Success(Option<T>),
    Failure(ErrorResponse),
}

/// Standardised result of a platform operation.
///
/// ```
/// use pbb_envelope::{ErrorResponse, ResponseEnvelope};
/// use pbb_error::PlatformError;
///
/// let ok = ResponseEnvelope::ok_with_data(42, "corr-1");
/// assert!(ok.is_success());
/// assert_eq!(ok.data(), Some(&42));
///
/// let err = PlatformError::not_found("Order", "7");
/// let failed: ResponseEnvelope<u32> = ResponseEnvelope::fail(ErrorResponse::from(&err), "corr-1");
/// assert!(failed.data().is_none());
/// assert_eq!(failed.error().unwrap().code.as_str(), "RESOURCE_NOT_FOUND");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope<T> {
    outcome: Outcome<T>,
    warnings: Vec<String>,
    correlation_id: String,
    metadata: BTreeMap<String, String>,
    timestamp: DateTime<Utc>,
}

impl<T> ResponseEnvelope<T> {
    fn build(outcome: Outcome<T>, correlation_id: String) -> Self {
        Self {
            outcome,
            warnings: Vec::new(),
            correlation_id,
            metadata: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Successful response without data.
    pub fn ok(correlation_id: impl Into<String>) -> Self {
        Self::build(Outcome::Success(None), correlation_id.into())
    }

    /// Successful response carrying `data`.
    ///
    /// On the wire a `null` data field decodes as "no data", so a payload
    /// whose JSON form is `null` (such as `()` or `None`) comes back as
    /// [`ok`](Self::ok).
    pub fn ok_with_data(data: T, correlation_id: impl Into<String>) -> Self {
        Self::build(Outcome::Success(Some(data)), correlation_id.into())
    }

    /// Failed response carrying `error`.
    pub fn fail(error: ErrorResponse, correlation_id: impl Into<String>) -> Self {
        Self::build(Outcome::Failure(error), correlation_id.into())
    }

    /// Append non-fatal notices, keeping their order.
    #[must_use]
    pub fn with_warnings<W>(mut self, warnings: impl IntoIterator<Item = W>) -> Self
    where
        W: Into<String>,
    {
        self.warnings.extend(warnings.into_iter().map(Into::into));
        self
    }

    /// Copy `metadata` into the envelope, overwriting existing keys.
    #[must_use]
    pub fn with_metadata<K, V>(mut self, metadata: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata
            .extend(metadata.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    /// Data of a successful response.
    pub fn data(&self) -> Option<&T> {
        match &self.outcome {
            Outcome::Success(data) => data.as_ref(),
            Outcome::Failure(_) => None,
        }
    }

    /// Error of a failed response.
    pub fn error(&self) -> Option<&ErrorResponse> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    /// Non-fatal notices in insertion order.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Correlation id echoed from the request.
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Metadata copied at construction.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// UTC instant the response was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Convert into a `Result`, dropping warnings and metadata.
    pub fn into_result(self) -> Result<Option<T>, ErrorResponse> {
        match self.outcome {
            Outcome::Success(data) => Ok(data),
            Outcome::Failure(error) => Err(error),
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WireRef<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorResponse>,
    warnings: &'a [String],
    correlation_id: &'a str,
    metadata: &'a BTreeMap<String, String>,
    timestamp: &'a DateTime<Utc>,
}

#[derive(Deserialize)]
struct Wire<T> {
    success: bool,
    data: Option<T>,
    error: Option<ErrorResponse>,
    #[serde(default)]
    warnings: Vec<String>,
    correlation_id: String,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    timestamp: DateTime<Utc>,
}

impl<T> Wire<T> {
    fn into_envelope(self) -> Result<ResponseEnvelope<T>, EnvelopeError> {
        let outcome = match (self.success, self.data, self.error) {
            (true, _, Some(_)) => return Err(EnvelopeError::SuccessWithError),
            (true, data, None) => Outcome::Success(data),
            (false, Some(_), _) => return Err(EnvelopeError::FailureWithData),
            (false, None, None) => return Err(EnvelopeError::FailureWithoutError),
            (false, None, Some(error)) => Outcome::Failure(error),
        };
        Ok(ResponseEnvelope {
            outcome,
            warnings: self.warnings,
            correlation_id: self.correlation_id,
            metadata: self.metadata,
            timestamp: self.timestamp,
        })
    }
}

impl<T: Serialize> Serialize for ResponseEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireRef {
            success: self.is_success(),
            data: self.data(),
            error: self.error(),
            warnings: &self.warnings,
            correlation_id: &self.correlation_id,
            metadata: &self.metadata,
            timestamp: &self.timestamp,
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ResponseEnvelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Wire::<T>::deserialize(deserializer)?;
        wire.into_envelope().map_err(serde::de::Error::custom)
    }
}
