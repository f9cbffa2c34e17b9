// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz response and request envelope deserialization with arbitrary bytes.
//!
//! Verifies:
//! 1. Decoding never panics, whatever the input.
//! 2. Any response that decodes holds data or an error, never both, and a
//!    failed response always holds an error.
//! 3. Decoded envelopes survive an encode/decode round-trip.
#![no_main]
use libfuzzer_sys::fuzz_target;
use pbb_envelope::{ErrorResponse, RequestEnvelope, ResponseEnvelope};
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    // --- Property 1 ---
    let _ = serde_json::from_slice::<ErrorResponse>(data);
    let _ = serde_json::from_slice::<RequestEnvelope<Value>>(data);
    let Ok(resp) = serde_json::from_slice::<ResponseEnvelope<Value>>(data) else {
        return;
    };

    // --- Property 2 ---
    if resp.is_success() {
        assert!(resp.error().is_none());
    } else {
        assert!(resp.data().is_none());
        assert!(resp.error().is_some());
    }

    // --- Property 3 ---
    let json = serde_json::to_vec(&resp).expect("decoded response must encode");
    let rt: ResponseEnvelope<Value> =
        serde_json::from_slice(&json).expect("round-trip decode must succeed");
    assert_eq!(rt.is_success(), resp.is_success());
    assert_eq!(rt.correlation_id(), resp.correlation_id());
});
