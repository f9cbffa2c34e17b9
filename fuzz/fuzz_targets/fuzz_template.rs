// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fuzz template rendering with arbitrary templates and contexts.
//!
//! Verifies:
//! 1. `render_template` and `placeholders` never panic.
//! 2. An empty context leaves the template unchanged.
//! 3. Every reported placeholder occurs in the template as `{name}`.
//! 4. A lone `{key}` renders to exactly the value, braces and all.
#![no_main]
use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pbb_error::template::{placeholders, render_template};
use serde_json::Value;

#[derive(Debug, Arbitrary)]
struct Input {
    template: String,
    context: Vec<(String, String)>,
}

fuzz_target!(|input: Input| {
    // --- Property 1 ---
    let context: BTreeMap<String, Value> = input
        .context
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    let _ = render_template(&input.template, &context);

    // --- Property 2 ---
    assert_eq!(
        render_template(&input.template, &BTreeMap::new()),
        input.template
    );

    // --- Property 3 ---
    for name in placeholders(&input.template) {
        assert!(input.template.contains(&format!("{{{name}}}")));
    }

    // --- Property 4 ---
    for (key, value) in &context {
        if key.contains(['{', '}']) {
            continue;
        }
        let rendered = render_template(&format!("{{{key}}}"), &context);
        assert_eq!(Value::String(rendered), *value);
    }
});
