// SPDX-License-Identifier: MIT OR Apache-2.0
//! Inbound operation envelope.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ErrorResponse, ResponseEnvelope};

/// Wrapper around the input of a platform operation.
///
/// Built once by the caller right before invoking an operation and read-only
/// afterwards. The correlation id is required and is neither generated nor
/// validated here; callers take it from their trace context.
///
/// ```
/// use std::time::Duration;
/// use pbb_envelope::RequestEnvelope;
///
/// let req = RequestEnvelope::new("payload", "corr-1")
///     .with_idempotency_key("idem-1")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(req.data(), Some(&"payload"));
/// assert_eq!(req.correlation_id(), "corr-1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    idempotency_key: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    timestamp: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "option_duration_millis"
    )]
    timeout: Option<Duration>,
}

impl<T> RequestEnvelope<T> {
    fn build(data: Option<T>, correlation_id: String) -> Self {
        Self {
            data,
            correlation_id,
            idempotency_key: None,
            metadata: BTreeMap::new(),
            timestamp: Utc::now(),
            timeout: None,
        }
    }

    /// Envelope for an operation that takes no payload.
    pub fn empty(correlation_id: impl Into<String>) -> Self {
        Self::build(None, correlation_id.into())
    }

    /// Envelope carrying `data`.
    pub fn new(data: T, correlation_id: impl Into<String>) -> Self {
        Self::build(Some(data), correlation_id.into())
    }

    /// Set the idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Copy `metadata` into the envelope, overwriting existing keys.
    ///
    /// Later changes to the caller's map are not observed.
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

    /// Set the operation timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Payload, if any.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the envelope and return the payload.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Correlation id supplied by the caller.
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Idempotency key supplied by the caller.
    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    /// Metadata copied at construction.
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// UTC instant the envelope was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Operation timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `timestamp + timeout`, or `None` without a timeout or on overflow.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        let timeout = chrono::Duration::from_std(self.timeout?).ok()?;
        self.timestamp.checked_add_signed(timeout)
    }

    /// Whether the deadline lies before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline().is_some_and(|deadline| now > deadline)
    }

    /// Successful payload-less reply echoing this request's correlation id.
    pub fn reply_ok<U>(&self) -> ResponseEnvelope<U> {
        ResponseEnvelope::ok(self.correlation_id.clone())
    }

    /// Successful reply carrying `data`.
    pub fn reply_ok_with_data<U>(&self, data: U) -> ResponseEnvelope<U> {
        ResponseEnvelope::ok_with_data(data, self.correlation_id.clone())
    }

    /// Failed reply carrying `error`.
    pub fn reply_fail<U>(&self, error: ErrorResponse) -> ResponseEnvelope<U> {
        ResponseEnvelope::fail(error, self.correlation_id.clone())
    }
}

/// Serde helper for `Option<Duration>` as whole milliseconds.
///
/// Sub-millisecond precision is dropped on the wire; durations beyond
/// `u64::MAX` milliseconds fail to serialize.
mod option_duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(val: &Option<Duration>, ser: S) -> Result<S::Ok, S::Error> {
        match val {
            Some(d) => u64::try_from(d.as_millis())
                .map_err(serde::ser::Error::custom)?
                .serialize(ser),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Duration>, D::Error> {
        let opt: Option<u64> = Option::deserialize(de)?;
        Ok(opt.map(Duration::from_millis))
    }
}
