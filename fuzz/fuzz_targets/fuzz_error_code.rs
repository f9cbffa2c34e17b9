// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz ErrorCode parsing and PlatformError construction.
//!
//! Verifies:
//! 1. Parsing arbitrary strings as ErrorCode (FromStr and JSON) never panics.
//! 2. Parsed codes agree across Display, as_str and serde.
//! 3. Constructors accept arbitrary argument text and keep the message equal
//!    to the template rendered from metadata.
#![no_main]
use pbb_error::template::render_template;
use pbb_error::{ErrorCode, PlatformError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    // --- Property 1 & 2: parsing never panics, forms agree ---
    if let Ok(code) = s.parse::<ErrorCode>() {
        assert_eq!(code.to_string(), code.as_str());
        assert_eq!(code.as_str(), s);
    }
    if let Ok(code) = serde_json::from_str::<ErrorCode>(s) {
        let json = serde_json::to_string(&code).expect("ErrorCode must serialize");
        let rt: ErrorCode = serde_json::from_str(&json).expect("round-trip must succeed");
        assert_eq!(code, rt);
    }

    // --- Property 3: arbitrary arguments ---
    let mid = s
        .char_indices()
        .nth(s.chars().count() / 2)
        .map_or(s.len(), |(i, _)| i);
    let (a, b) = s.split_at(mid);
    let errors = [
        PlatformError::already_exists_with_details(a, b, s),
        PlatformError::concurrency(a, b, s),
        PlatformError::forbidden(a, b, s),
        PlatformError::not_found(a, b),
        PlatformError::validation(a, b),
        PlatformError::unexpected(s.to_string()),
    ];
    for err in &errors {
        let rendered = render_template(err.code().message_template(), err.metadata());
        assert_eq!(rendered, err.message());
        assert!(err.to_string().starts_with('['));
    }
});
