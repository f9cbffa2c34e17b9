// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for error and envelope invariants.

use std::collections::BTreeMap;
use std::time::Duration;

use pbb_envelope::{ErrorResponse, ExposurePolicy, RequestEnvelope, ResponseEnvelope, respond};
use pbb_error::template::render_template;
use pbb_error::{ErrorCode, PlatformError};
use proptest::prelude::*;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Free text, biased towards braces and strings that look like the
/// catalog's own placeholders.
fn arb_arg() -> impl Strategy<Value = String> {
    prop_oneof![
        ".{0,24}",
        "[a-z {}]{0,24}",
        "\\{(target|reason|details|operation|resourceType|resourceIdentifier|actor)\\}",
    ]
}

/// Metadata value the catalog stores for a details argument.
fn details_clause(details: &str) -> String {
    if details.trim().is_empty() {
        String::new()
    } else {
        format!(" Detalhes: {details}")
    }
}

/// An error together with the metadata entries its arguments must produce.
fn arb_error_with_args() -> impl Strategy<Value = (PlatformError, Vec<(&'static str, String)>)> {
    (arb_arg(), arb_arg(), arb_arg(), 0usize..19).prop_map(|(a, b, c, pick)| {
        let (err, args) = match pick {
            0 => (
                PlatformError::already_exists(&a, &b),
                vec![("resourceType", a), ("resourceIdentifier", b), ("details", String::new())],
            ),
            1 => (
                PlatformError::already_exists_with_details(&a, &b, &c),
                vec![
                    ("resourceType", a),
                    ("resourceIdentifier", b),
                    ("details", details_clause(&c)),
                ],
            ),
            2 => (
                PlatformError::concurrency(&a, &b, &c),
                vec![("resourceType", a), ("resourceIdentifier", b), ("operation", c)],
            ),
            3 => (PlatformError::configuration(&a), vec![("configurationKey", a)]),
            4 => (PlatformError::conflict(&a, &b), vec![("operation", a), ("reason", b)]),
            5 => (
                PlatformError::contract_violation(&a, &b),
                vec![("contractName", a), ("details", b)],
            ),
            6 => (PlatformError::external_dependency(&a), vec![("dependency", a)]),
            7 => (
                PlatformError::forbidden(&a, &b, &c),
                vec![("actor", a), ("operation", b), ("resource", c)],
            ),
            8 => (PlatformError::invariant_violation(&a), vec![("invariant", a)]),
            9 => (PlatformError::message_deserialization(&a), vec![("messageType", a)]),
            10 => (
                PlatformError::message_processing(&a, &b),
                vec![("messageType", a), ("handler", b)],
            ),
            11 => (
                PlatformError::not_found(&a, &b),
                vec![("resourceType", a), ("resourceIdentifier", b)],
            ),
            12 => (PlatformError::operation_failed(&a), vec![("operation", a)]),
            13 => (PlatformError::rate_limit_exceeded(&a), vec![("limiter", a)]),
            14 => (PlatformError::service_unavailable(&a), vec![("serviceName", a)]),
            15 => (PlatformError::timeout(&a), vec![("operation", a)]),
            16 => (PlatformError::unauthorized(&a), vec![("actor", a)]),
            17 => (PlatformError::unexpected(a), vec![]),
            _ => (PlatformError::validation(&a, &b), vec![("target", a), ("reason", b)]),
        };
        (err, args)
    })
}

fn arb_error() -> impl Strategy<Value = PlatformError> {
    arb_error_with_args().prop_map(|(err, _)| err)
}

fn arb_metadata() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,8}", ".{0,16}", 0..6)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn message_is_rendered_from_metadata(err in arb_error()) {
        let rendered = render_template(err.code().message_template(), err.metadata());
        prop_assert_eq!(rendered, err.message());
    }

    #[test]
    fn message_and_metadata_keep_every_argument((err, args) in arb_error_with_args()) {
        for (key, value) in &args {
            prop_assert_eq!(&err.metadata()[*key], &Value::String(value.clone()));
            prop_assert!(
                err.message().contains(value.as_str()),
                "message {:?} lacks {:?}", err.message(), value
            );
        }
        prop_assert_eq!(err.metadata().len(), args.len());
    }

    #[test]
    fn metadata_values_are_strings(err in arb_error()) {
        for value in err.metadata().values() {
            prop_assert!(value.is_string());
        }
    }

    #[test]
    fn classification_follows_code(err in arb_error()) {
        let code = err.code();
        prop_assert_eq!(err.category(), code.category());
        prop_assert_eq!(err.is_expected(), code.is_expected());
        prop_assert_eq!(err.disposition(), code.disposition());
    }

    #[test]
    fn display_starts_with_code(err in arb_error()) {
        let shown = err.to_string();
        let prefix = format!("[{}] ", err.code());
        prop_assert!(shown.starts_with(&prefix));
    }

    #[test]
    fn error_response_copies_error(err in arb_error()) {
        let resp = ErrorResponse::from(&err);
        prop_assert_eq!(resp.code.known_code(), Some(err.code()));
        prop_assert_eq!(&resp.message, err.message());
        prop_assert_eq!(resp.category, err.category());
        prop_assert_eq!(resp.metadata.as_ref(), Some(err.metadata()));
    }

    #[test]
    fn error_response_survives_json(err in arb_error()) {
        let resp = ErrorResponse::from(&err);
        let json = serde_json::to_string(&resp).unwrap();
        let back: ErrorResponse = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, resp);
    }

    #[test]
    fn redaction_removes_only_listed_keys(err in arb_error(), redact_first in any::<bool>()) {
        let mut policy = ExposurePolicy::default();
        let first = err.metadata().keys().next().cloned();
        if redact_first && let Some(key) = &first {
            policy = policy.redact(key.clone());
        }
        let exposed = policy.error_response(&err).metadata.unwrap_or_default();
        for (key, value) in err.metadata() {
            let hidden = redact_first && Some(key) == first.as_ref();
            prop_assert_eq!(exposed.get(key), if hidden { None } else { Some(value) });
        }
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn template_without_placeholders_is_unchanged(text in "[^{}]{0,64}", value in ".{0,8}") {
        let ctx = BTreeMap::from([("k".to_string(), Value::String(value))]);
        prop_assert_eq!(render_template(&text, &ctx), text);
    }

    #[test]
    fn template_with_empty_context_is_unchanged(text in ".{0,64}") {
        prop_assert_eq!(render_template(&text, &BTreeMap::new()), text);
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn response_never_holds_data_and_error(
        result in prop_oneof![
            any::<i64>().prop_map(Ok::<i64, PlatformError>),
            arb_error().prop_map(Err),
        ],
        cid in "[a-z0-9-]{1,16}",
    ) {
        let resp: ResponseEnvelope<i64> = respond(result, cid.clone(), &ExposurePolicy::default());
        prop_assert_eq!(resp.correlation_id(), cid.as_str());
        if resp.is_success() {
            prop_assert!(resp.error().is_none());
            prop_assert!(resp.data().is_some());
        } else {
            prop_assert!(resp.data().is_none());
            prop_assert!(resp.error().is_some());
        }
    }

    #[test]
    fn response_json_roundtrip(
        data in prop::option::of(any::<u32>()),
        warnings in prop::collection::vec(".{0,12}", 0..4),
        metadata in arb_metadata(),
    ) {
        let resp = match data {
            Some(d) => ResponseEnvelope::ok_with_data(d, "c"),
            None => ResponseEnvelope::ok("c"),
        }
        .with_warnings(warnings.clone())
        .with_metadata(metadata.clone());
        let json = serde_json::to_string(&resp).unwrap();
        let back: ResponseEnvelope<u32> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.warnings(), warnings.as_slice());
        prop_assert_eq!(back.metadata(), &metadata);
        prop_assert_eq!(back, resp);
    }

    #[test]
    fn request_metadata_is_copied(metadata in arb_metadata(), extra in "[A-Z]{1,8}") {
        let mut caller = metadata.clone();
        let req: RequestEnvelope<()> = RequestEnvelope::empty("c").with_metadata(&caller);
        caller.insert(extra, "late".into());
        prop_assert_eq!(req.metadata(), &metadata);
    }

    #[test]
    fn deadline_is_timestamp_plus_timeout(ms in 0u64..10_000_000) {
        let req = RequestEnvelope::new(0u8, "c").with_timeout(Duration::from_millis(ms));
        let deadline = req.deadline().unwrap();
        prop_assert_eq!((deadline - req.timestamp()).num_milliseconds(), ms as i64);
    }

    #[test]
    fn code_strings_parse_back(idx in 0usize..18) {
        let code = ErrorCode::ALL[idx];
        prop_assert_eq!(code.as_str().parse::<ErrorCode>().unwrap(), code);
    }
}
