// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structured failure reporting and error statistics for service boundaries.
//!
//! [`init_tracing`] installs the process-wide subscriber, [`report_error`]
//! logs a caught [`PlatformError`] at the level its disposition calls for, and
//! [`ErrorStats`] counts failures by code and category.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use pbb_error::{Disposition, ErrorCategory, ErrorCode, PlatformError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Failures while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The level string is not a valid filter directive.
    #[error("invalid log level '{level}': {reason}")]
    InvalidLevel {
        /// Rejected level.
        level: String,
        /// Parser detail.
        reason: String,
    },
    /// Another global subscriber is already installed.
    #[error("tracing subscriber already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Install a global fmt subscriber filtered at `level`.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_tracing(level: &str) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialised(e.to_string()))
}

fn build_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(level).map_err(|e| TelemetryError::InvalidLevel {
        level: level.to_string(),
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Render the source chain of `err` as `outer: inner: ...`.
///
/// Returns `None` when the error has no cause.
pub fn cause_chain(err: &PlatformError) -> Option<String> {
    let mut parts = Vec::new();
    let mut current = err
        .cause()
        .map(|cause| cause as &(dyn std::error::Error + 'static));
    while let Some(cause) = current {
        parts.push(cause.to_string());
        current = cause.source();
    }
    (!parts.is_empty()).then(|| parts.join(": "))
}

/// Log a caught error at the level its disposition calls for.
///
/// Unexpected errors go to `error` together with their cause chain,
/// retryable ones to `warn`, everything else to `info`.
pub fn report_error(err: &PlatformError, correlation_id: &str) {
    let code = err.code();
    let category = err.category();
    match err.disposition() {
        Disposition::Unexpected => {
            let cause = cause_chain(err).unwrap_or_default();
            error!(
                target: "pbb.telemetry",
                code = %code,
                category = %category,
                correlation_id = %correlation_id,
                cause = %cause,
                "{}",
                err.message()
            );
        }
        Disposition::ExpectedRetryable => {
            warn!(
                target: "pbb.telemetry",
                code = %code,
                category = %category,
                correlation_id = %correlation_id,
                retryable = true,
                "{}",
                err.message()
            );
        }
        Disposition::ExpectedNonRetryable => {
            info!(
                target: "pbb.telemetry",
                code = %code,
                category = %category,
                correlation_id = %correlation_id,
                "{}",
                err.message()
            );
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorStats
// ---------------------------------------------------------------------------

/// Snapshot of the counters held by an [`ErrorStats`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorSummary {
    /// Errors recorded.
    pub total: u64,
    /// Of which were expected.
    pub expected: u64,
    /// Of which were unexpected.
    pub unexpected: u64,
    /// Of which were retryable.
    pub retryable: u64,
    /// Per-code counts (deterministic ordering).
    pub by_code: BTreeMap<String, u64>,
    /// Per-category counts (deterministic ordering).
    pub by_category: BTreeMap<String, u64>,
}

impl ErrorSummary {
    /// Share of unexpected errors, `0.0` when nothing was recorded.
    pub fn unexpected_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.unexpected as f64 / self.total as f64
        }
    }

    /// Count for a single code.
    pub fn count_for(&self, code: ErrorCode) -> u64 {
        self.by_code.get(code.as_str()).copied().unwrap_or(0)
    }

    /// Count for a single category.
    pub fn count_for_category(&self, category: ErrorCategory) -> u64 {
        self.by_category.get(category.as_str()).copied().unwrap_or(0)
    }
}

/// Thread-safe error counter (cheaply cloneable, backed by `Arc<Mutex<_>>`).
#[derive(Debug, Clone, Default)]
pub struct ErrorStats {
    inner: Arc<Mutex<ErrorSummary>>,
}

impl ErrorStats {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ErrorSummary> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count one occurrence of `err`.
    pub fn record(&self, err: &PlatformError) {
        let mut s = self.lock();
        s.total += 1;
        if err.is_expected() {
            s.expected += 1;
        } else {
            s.unexpected += 1;
        }
        if err.disposition().is_retryable() {
            s.retryable += 1;
        }
        *s.by_code.entry(err.code().as_str().to_string()).or_insert(0) += 1;
        *s.by_category
            .entry(err.category().as_str().to_string())
            .or_insert(0) += 1;
    }

    /// [`report_error`] followed by [`record`](Self::record).
    pub fn report(&self, err: &PlatformError, correlation_id: &str) {
        report_error(err, correlation_id);
        self.record(err);
    }

    /// Copy of the current counters.
    pub fn summary(&self) -> ErrorSummary {
        self.lock().clone()
    }

    /// Reset all counters.
    pub fn clear(&self) {
        *self.lock() = ErrorSummary::default();
    }
}
