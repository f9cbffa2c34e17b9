// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transport-agnostic operation envelopes.
//!
//! - [`RequestEnvelope`] wraps the input of an operation together with its
//!   correlation id, idempotency key, metadata and timeout.
//! - [`ResponseEnvelope`] wraps the outcome: data on success, an
//!   [`ErrorResponse`] on failure, plus warnings and metadata.
//! - [`boundary`] turns caught [`pbb_error::PlatformError`]s into responses.
//!
//! Nothing here knows about HTTP, queues or any other transport. All types
//! are plain serde values; the choice of wire format belongs to the caller.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod boundary;
mod error_response;
mod request;
mod response;

pub use boundary::{ExposurePolicy, respond, respond_empty, respond_to};
pub use error_response::{ErrorCodeResponse, ErrorResponse};
pub use request::RequestEnvelope;
pub use response::{EnvelopeError, ResponseEnvelope};
