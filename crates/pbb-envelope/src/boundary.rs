// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion of caught errors into responses at a service boundary.
//!
//! The boundary is the only place where a [`PlatformError`] turns into an
//! [`ErrorResponse`]. Layers below it propagate the error untouched.

use std::collections::BTreeSet;

use pbb_error::PlatformError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ErrorResponse, RequestEnvelope, ResponseEnvelope};

/// Which parts of an error's metadata a boundary exposes to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExposurePolicy {
    /// Copy metadata into responses at all.
    pub include_metadata: bool,
    /// Metadata keys that are stripped even when metadata is included.
    #[serde(default)]
    pub redacted_keys: BTreeSet<String>,
}

impl Default for ExposurePolicy {
    fn default() -> Self {
        Self {
            include_metadata: true,
            redacted_keys: BTreeSet::new(),
        }
    }
}

impl ExposurePolicy {
    /// Policy that never exposes metadata.
    pub fn opaque() -> Self {
        Self {
            include_metadata: false,
            redacted_keys: BTreeSet::new(),
        }
    }

    /// Add a key to strip from exposed metadata.
    #[must_use]
    pub fn redact(mut self, key: impl Into<String>) -> Self {
        self.redacted_keys.insert(key.into());
        self
    }

    /// Convert `err` according to this policy.
    pub fn error_response(&self, err: &PlatformError) -> ErrorResponse {
        if !self.include_metadata {
            return ErrorResponse::without_metadata(err);
        }
        ErrorResponse::without_metadata(err).with_metadata(
            err.metadata()
                .iter()
                .filter(|(key, _)| !self.redacted_keys.contains(*key))
                .map(|(key, value)| (key.clone(), value.clone())),
        )
    }
}

/// Wrap the outcome of an operation in a [`ResponseEnvelope`].
///
/// `Ok(data)` becomes a successful response carrying `data`; `Err(err)`
/// becomes a failed response whose error is shaped by `policy`.
pub fn respond<T>(
    result: Result<T, PlatformError>,
    correlation_id: impl Into<String>,
    policy: &ExposurePolicy,
) -> ResponseEnvelope<T> {
    let correlation_id = correlation_id.into();
    match result {
        Ok(data) => ResponseEnvelope::ok_with_data(data, correlation_id),
        Err(err) => fail(&err, correlation_id, policy),
    }
}

/// Like [`respond`] for operations that return nothing.
pub fn respond_empty<T>(
    result: Result<(), PlatformError>,
    correlation_id: impl Into<String>,
    policy: &ExposurePolicy,
) -> ResponseEnvelope<T> {
    let correlation_id = correlation_id.into();
    match result {
        Ok(()) => ResponseEnvelope::ok(correlation_id),
        Err(err) => fail(&err, correlation_id, policy),
    }
}

/// Like [`respond`], echoing the correlation id of `request`.
pub fn respond_to<T, U>(
    request: &RequestEnvelope<U>,
    result: Result<T, PlatformError>,
    policy: &ExposurePolicy,
) -> ResponseEnvelope<T> {
    respond(result, request.correlation_id(), policy)
}

fn fail<T>(
    err: &PlatformError,
    correlation_id: String,
    policy: &ExposurePolicy,
) -> ResponseEnvelope<T> {
    debug!(
        target: "pbb.boundary",
        code = %err.code(),
        category = %err.category(),
        expected = err.is_expected(),
        correlation_id = %correlation_id,
        "operation failed"
    );
    ResponseEnvelope::fail(policy.error_response(err), correlation_id)
}
