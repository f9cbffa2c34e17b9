// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed payloads of the error catalog.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::ErrorCode;

/// Catalog variant together with the values it was raised with.
///
/// Each variant maps to exactly one [`ErrorCode`]. Field values become both
/// the template substitutions and the metadata entries of the resulting
/// [`PlatformError`](crate::PlatformError); the metadata keys are the
/// camelCase names listed on each variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Keys: `resourceType`, `resourceIdentifier`, `details`.
    AlreadyExists {
        /// Kind of resource, e.g. `"Order"`.
        resource_type: String,
        /// Identifier that collided.
        resource_identifier: String,
        /// Extra detail; blank values are normalised to `None`.
        details: Option<String>,
    },
    /// Keys: `resourceType`, `resourceIdentifier`, `operation`.
    Concurrency {
        /// Kind of resource.
        resource_type: String,
        /// Identifier of the contended resource.
        resource_identifier: String,
        /// Operation that lost the race.
        operation: String,
    },
    /// Keys: `configurationKey`.
    Configuration {
        /// Missing or malformed configuration key.
        configuration_key: String,
    },
    /// Keys: `operation`, `reason`.
    Conflict {
        /// Operation that hit the conflicting state.
        operation: String,
        /// Why the state conflicts.
        reason: String,
    },
    /// Keys: `contractName`, `details`.
    ContractViolation {
        /// Contract that was broken.
        contract_name: String,
        /// What was wrong.
        details: String,
    },
    /// Keys: `dependency`.
    ExternalDependency {
        /// Name of the external system.
        dependency: String,
    },
    /// Keys: `actor`, `operation`, `resource`.
    Forbidden {
        /// Authenticated identity.
        actor: String,
        /// Operation that was attempted.
        operation: String,
        /// Resource the operation targeted.
        resource: String,
    },
    /// Keys: `invariant`.
    InvariantViolation {
        /// Name or description of the invariant.
        invariant: String,
    },
    /// Keys: `messageType`.
    MessageDeserialization {
        /// Type of the message that could not be decoded.
        message_type: String,
    },
    /// Keys: `messageType`, `handler`.
    MessageProcessing {
        /// Type of the message being handled.
        message_type: String,
        /// Handler that failed.
        handler: String,
    },
    /// Keys: `resourceType`, `resourceIdentifier`.
    NotFound {
        /// Kind of resource.
        resource_type: String,
        /// Identifier that was looked up.
        resource_identifier: String,
    },
    /// Keys: `operation`.
    OperationFailed {
        /// Operation that failed.
        operation: String,
    },
    /// Keys: `limiter`.
    RateLimitExceeded {
        /// Name of the limiter that rejected the call.
        limiter: String,
    },
    /// Keys: `serviceName`.
    ServiceUnavailable {
        /// Unavailable service.
        service_name: String,
    },
    /// Keys: `operation`.
    Timeout {
        /// Operation that ran out of time.
        operation: String,
    },
    /// Keys: `actor`.
    Unauthorized {
        /// Identity that failed authentication.
        actor: String,
    },
    /// No metadata; always carries a cause.
    UnexpectedPlatform,
    /// Keys: `target`, `reason`.
    Validation {
        /// What was validated.
        target: String,
        /// Why validation failed.
        reason: String,
    },
}

impl ErrorKind {
    /// Stable code of this variant.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AlreadyExists { .. } => ErrorCode::ResourceAlreadyExists,
            Self::Concurrency { .. } => ErrorCode::ConcurrencyConflict,
            Self::Configuration { .. } => ErrorCode::InvalidConfiguration,
            Self::Conflict { .. } => ErrorCode::StateConflict,
            Self::ContractViolation { .. } => ErrorCode::ContractViolation,
            Self::ExternalDependency { .. } => ErrorCode::ExternalDependencyFailure,
            Self::Forbidden { .. } => ErrorCode::ForbiddenOperation,
            Self::InvariantViolation { .. } => ErrorCode::InvariantViolation,
            Self::MessageDeserialization { .. } => ErrorCode::MessageDeserializationFailed,
            Self::MessageProcessing { .. } => ErrorCode::MessageProcessingFailed,
            Self::NotFound { .. } => ErrorCode::ResourceNotFound,
            Self::OperationFailed { .. } => ErrorCode::OperationFailed,
            Self::RateLimitExceeded { .. } => ErrorCode::RateLimitExceeded,
            Self::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            Self::Timeout { .. } => ErrorCode::OperationTimeout,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::UnexpectedPlatform => ErrorCode::UnexpectedError,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
        }
    }

    /// Substitution context for the message template.
    ///
    /// This is also the metadata snapshot stored on the error.
    pub fn context(&self) -> BTreeMap<String, Value> {
        match self {
            Self::AlreadyExists {
                resource_type,
                resource_identifier,
                details,
            } => {
                let clause = details
                    .as_deref()
                    .map(|d| format!(" Detalhes: {d}"))
                    .unwrap_or_default();
                entries([
                    ("resourceType", resource_type.as_str()),
                    ("resourceIdentifier", resource_identifier.as_str()),
                    ("details", clause.as_str()),
                ])
            }
            Self::Concurrency {
                resource_type,
                resource_identifier,
                operation,
            } => entries([
                ("resourceType", resource_type.as_str()),
                ("resourceIdentifier", resource_identifier.as_str()),
                ("operation", operation.as_str()),
            ]),
            Self::Configuration { configuration_key } => {
                entries([("configurationKey", configuration_key.as_str())])
            }
            Self::Conflict { operation, reason } => {
                entries([("operation", operation.as_str()), ("reason", reason.as_str())])
            }
            Self::ContractViolation {
                contract_name,
                details,
            } => entries([
                ("contractName", contract_name.as_str()),
                ("details", details.as_str()),
            ]),
            Self::ExternalDependency { dependency } => {
                entries([("dependency", dependency.as_str())])
            }
            Self::Forbidden {
                actor,
                operation,
                resource,
            } => entries([
                ("actor", actor.as_str()),
                ("operation", operation.as_str()),
                ("resource", resource.as_str()),
            ]),
            Self::InvariantViolation { invariant } => {
                entries([("invariant", invariant.as_str())])
            }
            Self::MessageDeserialization { message_type } => {
                entries([("messageType", message_type.as_str())])
            }
            Self::MessageProcessing {
                message_type,
                handler,
            } => entries([
                ("messageType", message_type.as_str()),
                ("handler", handler.as_str()),
            ]),
            Self::NotFound {
                resource_type,
                resource_identifier,
            } => entries([
                ("resourceType", resource_type.as_str()),
                ("resourceIdentifier", resource_identifier.as_str()),
            ]),
            Self::OperationFailed { operation } | Self::Timeout { operation } => {
                entries([("operation", operation.as_str())])
            }
            Self::RateLimitExceeded { limiter } => entries([("limiter", limiter.as_str())]),
            Self::ServiceUnavailable { service_name } => {
                entries([("serviceName", service_name.as_str())])
            }
            Self::Unauthorized { actor } => entries([("actor", actor.as_str())]),
            Self::UnexpectedPlatform => BTreeMap::new(),
            Self::Validation { target, reason } => {
                entries([("target", target.as_str()), ("reason", reason.as_str())])
            }
        }
    }
}

fn entries<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_exists_without_details_has_empty_clause() {
        let kind = ErrorKind::AlreadyExists {
            resource_type: "X".into(),
            resource_identifier: "1".into(),
            details: None,
        };
        assert_eq!(kind.context()["details"], Value::String(String::new()));
    }

    #[test]
    fn already_exists_with_details_prefixes_clause() {
        let kind = ErrorKind::AlreadyExists {
            resource_type: "X".into(),
            resource_identifier: "1".into(),
            details: Some("dup".into()),
        };
        assert_eq!(kind.context()["details"], Value::String(" Detalhes: dup".into()));
    }

    #[test]
    fn unexpected_platform_has_no_context() {
        assert!(ErrorKind::UnexpectedPlatform.context().is_empty());
    }

    #[test]
    fn context_keys_match_template_placeholders() {
        let kind = ErrorKind::Forbidden {
            actor: "a".into(),
            operation: "o".into(),
            resource: "r".into(),
        };
        let keys: Vec<_> = kind.context().into_keys().collect();
        let mut placeholders = crate::template::placeholders(kind.code().message_template());
        placeholders.sort_unstable();
        assert_eq!(keys, placeholders);
    }
}
