// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for service boundaries.
//!
//! This crate provides [`BoundaryConfig`], the settings a service boundary
//! needs to log failures and shape error responses, together with helpers for
//! loading from TOML files, applying `PBB_*` environment overrides, merging
//! overlays, and producing advisory [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use pbb_envelope::ExposurePolicy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file could not be read.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// An environment override holds a value of the wrong type.
    #[error("invalid value '{value}' for environment variable {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// The default request timeout is unusually large.
    LargeTimeout {
        /// Timeout value in milliseconds.
        millis: u64,
    },
    /// Keys are listed for redaction while metadata is not exposed at all.
    RedundantRedaction {
        /// Keys that will never be exposed anyway.
        keys: Vec<String>,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::LargeTimeout { millis } => {
                write!(f, "default timeout is unusually large ({millis}ms)")
            }
            ConfigWarning::RedundantRedaction { keys } => {
                write!(
                    f,
                    "metadata is not exposed, redaction of {keys:?} has no effect"
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Settings of a service boundary.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct BoundaryConfig {
    /// Logical service name, used in log output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    /// Log level (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Whether error metadata is copied into responses. Defaults to `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_metadata: Option<bool>,

    /// Metadata keys stripped from every exposed error.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redacted_metadata_keys: Vec<String>,

    /// Timeout applied to requests that do not carry one, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_timeout_ms: Option<u64>,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            service_name: None,
            log_level: Some("info".into()),
            expose_metadata: None,
            redacted_metadata_keys: Vec::new(),
            default_timeout_ms: None,
        }
    }
}

impl BoundaryConfig {
    /// Exposure policy derived from `expose_metadata` and the redaction list.
    pub fn exposure_policy(&self) -> ExposurePolicy {
        let base = if self.expose_metadata.unwrap_or(true) {
            ExposurePolicy::default()
        } else {
            ExposurePolicy::opaque()
        };
        self.redacted_metadata_keys
            .iter()
            .fold(base, |policy, key| policy.redact(key.as_str()))
    }

    /// Default request timeout as a [`Duration`].
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }

    /// Effective log level, falling back to `"info"`.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum allowed default timeout (24 hours).
const MAX_TIMEOUT_MS: u64 = 86_400_000;

/// Threshold above which a default timeout generates a warning (5 minutes).
const LARGE_TIMEOUT_THRESHOLD_MS: u64 = 300_000;

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`BoundaryConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`BoundaryConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<BoundaryConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => BoundaryConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string into a [`BoundaryConfig`].
pub fn parse_toml(content: &str) -> Result<BoundaryConfig, ConfigError> {
    toml::from_str::<BoundaryConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `PBB_SERVICE_NAME`
/// - `PBB_LOG_LEVEL`
/// - `PBB_EXPOSE_METADATA` (`true`/`false`/`1`/`0`)
/// - `PBB_DEFAULT_TIMEOUT_MS`
pub fn apply_env_overrides(config: &mut BoundaryConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |var| std::env::var(var).ok())
}

/// Apply overrides read through `lookup` instead of the process environment.
pub fn apply_overrides_from(
    config: &mut BoundaryConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(val) = lookup("PBB_SERVICE_NAME") {
        config.service_name = Some(val);
    }
    if let Some(val) = lookup("PBB_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    if let Some(val) = lookup("PBB_EXPOSE_METADATA") {
        let parsed = match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    var: "PBB_EXPOSE_METADATA",
                    value: val,
                });
            }
        };
        config.expose_metadata = Some(parsed);
    }
    if let Some(val) = lookup("PBB_DEFAULT_TIMEOUT_MS") {
        let millis = val.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
            var: "PBB_DEFAULT_TIMEOUT_MS",
            value: val.clone(),
        })?;
        config.default_timeout_ms = Some(millis);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (unknown log level, out-of-range timeout, blank redaction
/// keys) are returned as a [`ConfigError::ValidationError`]; soft issues come
/// back as warnings.
pub fn validate_config(config: &BoundaryConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    if let Some(ref name) = config.service_name
        && name.trim().is_empty()
    {
        errors.push("service_name must not be blank".into());
    }

    if let Some(ms) = config.default_timeout_ms {
        if ms == 0 || ms > MAX_TIMEOUT_MS {
            errors.push(format!(
                "default_timeout_ms {ms} out of range (1..{MAX_TIMEOUT_MS})"
            ));
        } else if ms > LARGE_TIMEOUT_THRESHOLD_MS {
            warnings.push(ConfigWarning::LargeTimeout { millis: ms });
        }
    }

    if config
        .redacted_metadata_keys
        .iter()
        .any(|k| k.trim().is_empty())
    {
        errors.push("redacted_metadata_keys must not contain blank keys".into());
    }

    if config.expose_metadata == Some(false) && !config.redacted_metadata_keys.is_empty() {
        warnings.push(ConfigWarning::RedundantRedaction {
            keys: config.redacted_metadata_keys.clone(),
        });
    }

    if config.service_name.is_none() {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "service_name".into(),
            hint: "log lines will not identify the service".into(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
///
/// Redaction lists are combined without duplicates, base entries first.
pub fn merge_configs(base: BoundaryConfig, overlay: BoundaryConfig) -> BoundaryConfig {
    let mut redacted_metadata_keys = base.redacted_metadata_keys;
    for key in overlay.redacted_metadata_keys {
        if !redacted_metadata_keys.contains(&key) {
            redacted_metadata_keys.push(key);
        }
    }
    BoundaryConfig {
        service_name: overlay.service_name.or(base.service_name),
        log_level: overlay.log_level.or(base.log_level),
        expose_metadata: overlay.expose_metadata.or(base.expose_metadata),
        redacted_metadata_keys,
        default_timeout_ms: overlay.default_timeout_ms.or(base.default_timeout_ms),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
