// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz BoundaryConfig TOML parsing and validation.
//!
//! Verifies:
//! 1. `parse_toml` never panics on arbitrary input.
//! 2. Parsed configs can be validated and turned into a policy without panics.
//! 3. Round-trip: serialize back to TOML and re-parse produces the same config.
#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    // --- Property 1 ---
    let config = match pbb_config::parse_toml(s) {
        Ok(c) => c,
        Err(_) => return,
    };

    // --- Property 2 ---
    match pbb_config::validate_config(&config) {
        Ok(warnings) => {
            for w in &warnings {
                let _ = format!("{w}");
            }
        }
        Err(e) => {
            let _ = format!("{e}");
        }
    }
    let _ = config.exposure_policy();
    let _ = config.default_timeout();

    // --- Property 3 ---
    if let Ok(toml_str) = toml::to_string(&config)
        && let Ok(rt) = pbb_config::parse_toml(&toml_str)
    {
        assert_eq!(config, rt, "TOML round-trip must be lossless");
    }
});
