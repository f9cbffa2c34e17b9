// SPDX-License-Identifier: MIT OR Apache-2.0
//! Platform error taxonomy with stable error codes.
//!
//! Every [`PlatformError`] carries an [`ErrorCode`] (a machine-readable,
//! stable string tag), an expected/unexpected classification, a metadata map
//! and a human-readable message rendered from the code's template. Errors are
//! created through one constructor per catalog entry, for example
//! [`PlatformError::not_found`].
//!
//! The [`ErrorCategory`] of a code is a fixed property of the catalog; turning
//! an error into a transport-facing response is left to the boundary crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod kind;
pub mod template;

pub use kind::ErrorKind;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Structured context attached to a [`PlatformError`].
pub type Metadata = BTreeMap<String, Value>;

/// Boxed cause carried by a [`PlatformError`].
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Coarse classification of where a failure comes from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Origin could not be classified.
    Unknown,
    /// Input failed validation.
    Validation,
    /// A business rule rejected the operation.
    Business,
    /// A referenced resource does not exist.
    NotFound,
    /// The operation collides with existing state.
    Conflict,
    /// Authentication or authorisation failure.
    Security,
    /// An infrastructure component failed.
    Infrastructure,
    /// Configuration is missing or malformed.
    Configuration,
    /// The operation ran out of time.
    Timeout,
    /// A service or quota is temporarily unavailable.
    Unavailable,
}

impl ErrorCategory {
    /// Every category, in declaration order.
    pub const ALL: [ErrorCategory; 10] = [
        Self::Unknown,
        Self::Validation,
        Self::Business,
        Self::NotFound,
        Self::Conflict,
        Self::Security,
        Self::Infrastructure,
        Self::Configuration,
        Self::Timeout,
        Self::Unavailable,
    ];

    /// Stable snake_case name, identical to the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Validation => "validation",
            Self::Business => "business",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Security => "security",
            Self::Infrastructure => "infrastructure",
            Self::Configuration => "configuration",
            Self::Timeout => "timeout",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Disposition
// ---------------------------------------------------------------------------

/// What a consumer should do about a failure.
///
/// Derived from the expected flag and the retry intent of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Anticipated and transient; the caller may retry an idempotent call.
    ExpectedRetryable,
    /// Anticipated and deterministic; retrying yields the same failure.
    ExpectedNonRetryable,
    /// Defect or broken environment; escalate.
    Unexpected,
}

impl Disposition {
    /// Whether a caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExpectedRetryable)
    }

    /// Whether the failure should page someone.
    pub fn should_escalate(&self) -> bool {
        matches!(self, Self::Unexpected)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serialises to the `SCREAMING_SNAKE_CASE` string returned by
/// [`ErrorCode::as_str`]. Codes are part of the platform contract and must
/// not be renamed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A resource with the same identity already exists.
    ResourceAlreadyExists,
    /// Optimistic concurrency check failed.
    ConcurrencyConflict,
    /// A configuration key is missing or malformed.
    InvalidConfiguration,
    /// The current state does not allow the operation.
    StateConflict,
    /// A contract between components was broken.
    ContractViolation,
    /// An external dependency failed.
    ExternalDependencyFailure,
    /// The actor is not allowed to perform the operation.
    ForbiddenOperation,
    /// An internal invariant does not hold.
    InvariantViolation,
    /// A message could not be deserialised.
    MessageDeserializationFailed,
    /// A message handler failed.
    MessageProcessingFailed,
    /// The requested resource does not exist.
    ResourceNotFound,
    /// An operation failed for an unspecified reason.
    OperationFailed,
    /// A rate limiter rejected the call.
    RateLimitExceeded,
    /// A service is temporarily unavailable.
    ServiceUnavailable,
    /// An operation exceeded its time limit.
    OperationTimeout,
    /// The caller is not authenticated.
    Unauthorized,
    /// Catch-all wrapper around an unclassified failure.
    UnexpectedError,
    /// Input validation failed.
    ValidationFailed,
}

impl ErrorCode {
    /// The whole catalog.
    pub const ALL: [ErrorCode; 18] = [
        Self::ResourceAlreadyExists,
        Self::ConcurrencyConflict,
        Self::InvalidConfiguration,
        Self::StateConflict,
        Self::ContractViolation,
        Self::ExternalDependencyFailure,
        Self::ForbiddenOperation,
        Self::InvariantViolation,
        Self::MessageDeserializationFailed,
        Self::MessageProcessingFailed,
        Self::ResourceNotFound,
        Self::OperationFailed,
        Self::RateLimitExceeded,
        Self::ServiceUnavailable,
        Self::OperationTimeout,
        Self::Unauthorized,
        Self::UnexpectedError,
        Self::ValidationFailed,
    ];

    /// Stable `&'static str` representation (e.g. `"RESOURCE_NOT_FOUND"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResourceAlreadyExists => "RESOURCE_ALREADY_EXISTS",
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::InvalidConfiguration => "INVALID_CONFIGURATION",
            Self::StateConflict => "STATE_CONFLICT",
            Self::ContractViolation => "CONTRACT_VIOLATION",
            Self::ExternalDependencyFailure => "EXTERNAL_DEPENDENCY_FAILURE",
            Self::ForbiddenOperation => "FORBIDDEN_OPERATION",
            Self::InvariantViolation => "INVARIANT_VIOLATION",
            Self::MessageDeserializationFailed => "MESSAGE_DESERIALIZATION_FAILED",
            Self::MessageProcessingFailed => "MESSAGE_PROCESSING_FAILED",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::OperationFailed => "OPERATION_FAILED",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::OperationTimeout => "OPERATION_TIMEOUT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
            Self::ValidationFailed => "VALIDATION_FAILED",
        }
    }

    /// Category reported for this code at a boundary.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ResourceAlreadyExists | Self::ConcurrencyConflict | Self::StateConflict => {
                ErrorCategory::Conflict
            }
            Self::InvalidConfiguration => ErrorCategory::Configuration,
            Self::ContractViolation
            | Self::InvariantViolation
            | Self::OperationFailed
            | Self::UnexpectedError => ErrorCategory::Unknown,
            Self::ExternalDependencyFailure => ErrorCategory::Infrastructure,
            Self::ForbiddenOperation | Self::Unauthorized => ErrorCategory::Security,
            Self::MessageDeserializationFailed | Self::ValidationFailed => {
                ErrorCategory::Validation
            }
            Self::MessageProcessingFailed => ErrorCategory::Business,
            Self::ResourceNotFound => ErrorCategory::NotFound,
            Self::RateLimitExceeded | Self::ServiceUnavailable => ErrorCategory::Unavailable,
            Self::OperationTimeout => ErrorCategory::Timeout,
        }
    }

    /// `true` for anticipated domain, business or security conditions,
    /// `false` for defects and broken environments.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            Self::InvalidConfiguration
                | Self::ContractViolation
                | Self::InvariantViolation
                | Self::MessageDeserializationFailed
                | Self::OperationFailed
                | Self::UnexpectedError
        )
    }

    /// Whether an idempotent call that failed with this code may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded
                | Self::ServiceUnavailable
                | Self::ConcurrencyConflict
                | Self::OperationTimeout
        )
    }

    /// Alerting and retry disposition.
    pub fn disposition(&self) -> Disposition {
        if !self.is_expected() {
            Disposition::Unexpected
        } else if self.is_retryable() {
            Disposition::ExpectedRetryable
        } else {
            Disposition::ExpectedNonRetryable
        }
    }

    /// Message template with `{name}` placeholders.
    pub fn message_template(&self) -> &'static str {
        match self {
            Self::ResourceAlreadyExists => {
                "O recurso do tipo '{resourceType}' com identificador '{resourceIdentifier}' já existe.{details}"
            }
            Self::ConcurrencyConflict => {
                "Conflito de concorrência ao executar a operação '{operation}' no recurso '{resourceType}' com identificador '{resourceIdentifier}'."
            }
            Self::InvalidConfiguration => {
                "Configuração inválida, ausente ou malformada para a chave '{configurationKey}'."
            }
            Self::StateConflict => {
                "Conflito de estado ao executar a operação '{operation}'. Motivo: {reason}."
            }
            Self::ContractViolation => {
                "Violação do contrato '{contractName}'. Detalhes: {details}."
            }
            Self::ExternalDependencyFailure => {
                "Falha ao interagir com a dependência externa '{dependency}'."
            }
            Self::ForbiddenOperation => {
                "A identidade '{actor}' não possui permissão para executar a operação '{operation}' no recurso '{resource}'."
            }
            Self::InvariantViolation => "A invariante '{invariant}' foi violada.",
            Self::MessageDeserializationFailed => {
                "Falha ao desserializar mensagem do tipo '{messageType}'."
            }
            Self::MessageProcessingFailed => {
                "Falha ao processar mensagem do tipo '{messageType}' no handler '{handler}'."
            }
            Self::ResourceNotFound => {
                "Recurso do tipo '{resourceType}' com identificador '{resourceIdentifier}' não foi encontrado."
            }
            Self::OperationFailed => "A operação '{operation}' falhou.",
            Self::RateLimitExceeded => {
                "O limite de requisições definido por '{limiter}' foi excedido."
            }
            Self::ServiceUnavailable => {
                "O serviço '{serviceName}' encontra-se indisponível no momento."
            }
            Self::OperationTimeout => "A operação '{operation}' excedeu o tempo limite permitido.",
            Self::Unauthorized => "A identidade '{actor}' não está autenticada.",
            Self::UnexpectedError => "Ocorreu um erro inesperado na plataforma.",
            Self::ValidationFailed => "Falha de validação no alvo '{target}'. Motivo: {reason}.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PlatformError
// ---------------------------------------------------------------------------

/// A cataloged platform failure.
///
/// The message and metadata are computed once, when the error is created,
/// and cannot change afterwards. The optional cause is kept for diagnostics
/// and is reachable through [`std::error::Error::source`]; it is never part
/// of what a boundary exposes.
///
/// ```
/// use pbb_error::{ErrorCode, PlatformError};
///
/// let err = PlatformError::not_found("Order", "123");
/// assert_eq!(err.code(), ErrorCode::ResourceNotFound);
/// assert!(err.is_expected());
/// assert_eq!(
///     err.message(),
///     "Recurso do tipo 'Order' com identificador '123' não foi encontrado."
/// );
/// ```
pub struct PlatformError {
    kind: ErrorKind,
    message: String,
    metadata: Metadata,
    cause: Option<Cause>,
}

impl PlatformError {
    fn from_kind(kind: ErrorKind) -> Self {
        let metadata = kind.context();
        let message = template::render_template(kind.code().message_template(), &metadata);
        Self {
            kind,
            message,
            metadata,
            cause: None,
        }
    }

    /// `RESOURCE_ALREADY_EXISTS` without a details clause.
    pub fn already_exists(
        resource_type: impl Into<String>,
        resource_identifier: impl Into<String>,
    ) -> Self {
        Self::from_kind(ErrorKind::AlreadyExists {
            resource_type: resource_type.into(),
            resource_identifier: resource_identifier.into(),
            details: None,
        })
    }

    /// `RESOURCE_ALREADY_EXISTS` with a details clause.
    ///
    /// Blank details are treated as absent.
    pub fn already_exists_with_details(
        resource_type: impl Into<String>,
        resource_identifier: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let details = details.into();
        Self::from_kind(ErrorKind::AlreadyExists {
            resource_type: resource_type.into(),
            resource_identifier: resource_identifier.into(),
            details: (!details.trim().is_empty()).then_some(details),
        })
    }

    /// `CONCURRENCY_CONFLICT`.
    pub fn concurrency(
        resource_type: impl Into<String>,
        resource_identifier: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self::from_kind(ErrorKind::Concurrency {
            resource_type: resource_type.into(),
            resource_identifier: resource_identifier.into(),
            operation: operation.into(),
        })
    }

    /// `INVALID_CONFIGURATION`.
    pub fn configuration(configuration_key: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Configuration {
            configuration_key: configuration_key.into(),
        })
    }

    /// `STATE_CONFLICT`.
    pub fn conflict(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Conflict {
            operation: operation.into(),
            reason: reason.into(),
        })
    }

    /// `CONTRACT_VIOLATION`.
    pub fn contract_violation(
        contract_name: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::from_kind(ErrorKind::ContractViolation {
            contract_name: contract_name.into(),
            details: details.into(),
        })
    }

    /// `EXTERNAL_DEPENDENCY_FAILURE`.
    pub fn external_dependency(dependency: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::ExternalDependency {
            dependency: dependency.into(),
        })
    }

    /// `FORBIDDEN_OPERATION`.
    pub fn forbidden(
        actor: impl Into<String>,
        operation: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self::from_kind(ErrorKind::Forbidden {
            actor: actor.into(),
            operation: operation.into(),
            resource: resource.into(),
        })
    }

    /// `INVARIANT_VIOLATION`.
    pub fn invariant_violation(invariant: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::InvariantViolation {
            invariant: invariant.into(),
        })
    }

    /// `MESSAGE_DESERIALIZATION_FAILED`.
    pub fn message_deserialization(message_type: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::MessageDeserialization {
            message_type: message_type.into(),
        })
    }

    /// `MESSAGE_PROCESSING_FAILED`.
    pub fn message_processing(message_type: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::MessageProcessing {
            message_type: message_type.into(),
            handler: handler.into(),
        })
    }

    /// `RESOURCE_NOT_FOUND`.
    pub fn not_found(
        resource_type: impl Into<String>,
        resource_identifier: impl Into<String>,
    ) -> Self {
        Self::from_kind(ErrorKind::NotFound {
            resource_type: resource_type.into(),
            resource_identifier: resource_identifier.into(),
        })
    }

    /// `OPERATION_FAILED`.
    pub fn operation_failed(operation: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::OperationFailed {
            operation: operation.into(),
        })
    }

    /// `RATE_LIMIT_EXCEEDED`.
    pub fn rate_limit_exceeded(limiter: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::RateLimitExceeded {
            limiter: limiter.into(),
        })
    }

    /// `SERVICE_UNAVAILABLE`.
    pub fn service_unavailable(service_name: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::ServiceUnavailable {
            service_name: service_name.into(),
        })
    }

    /// `OPERATION_TIMEOUT`.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Timeout {
            operation: operation.into(),
        })
    }

    /// `UNAUTHORIZED`.
    pub fn unauthorized(actor: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Unauthorized {
            actor: actor.into(),
        })
    }

    /// `UNEXPECTED_ERROR` wrapping an unclassified failure.
    pub fn unexpected(cause: impl Into<Cause>) -> Self {
        Self::from_kind(ErrorKind::UnexpectedPlatform).with_cause(cause)
    }

    /// `VALIDATION_FAILED`.
    pub fn validation(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::from_kind(ErrorKind::Validation {
            target: target.into(),
            reason: reason.into(),
        })
    }

    /// Attach the underlying failure, replacing any previous cause.
    ///
    /// Code, message and metadata are unaffected.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// Typed catalog entry.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Whether the failure is an anticipated condition.
    pub fn is_expected(&self) -> bool {
        self.code().is_expected()
    }

    /// Shorthand for `self.code().category()`.
    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Shorthand for `self.code().disposition()`.
    pub fn disposition(&self) -> Disposition {
        self.code().disposition()
    }

    /// Rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Metadata snapshot taken at construction.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Underlying failure, if one was attached.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Debug for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("PlatformError");
        d.field("code", &self.code());
        d.field("message", &self.message);
        d.field("expected", &self.is_expected());
        if !self.metadata.is_empty() {
            d.field("metadata", &self.metadata);
        }
        if let Some(ref cause) = self.cause {
            d.field("cause", &cause.to_string());
        }
        d.finish()
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code().as_str(), self.message)
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
