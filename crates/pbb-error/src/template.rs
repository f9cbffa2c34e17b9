// SPDX-License-Identifier: MIT OR Apache-2.0
//! Placeholder substitution for error message templates.
//!
//! Templates contain `{name}` placeholders. Rendering makes one left-to-right
//! pass over the template and replaces every `{key}` with the string form of
//! the associated value. Inserted values are written as-is and never scanned
//! again, so a value containing `{other}` stays literal.
//!
//! Substitution is lenient:
//!
//! - a placeholder with no matching context entry is left verbatim, and
//! - a context entry with no matching placeholder is ignored for the message
//!   (it still ends up in the error's metadata).
//!
//! Metadata is therefore a superset of the keys a template consumes, and a
//! template may reference keys the context never supplies. Callers that need
//! a strict check can use [`placeholders`] to compare the two sets.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::Value;

/// Render `template` against `context`.
///
/// Never fails, and the output does not depend on the order of the context
/// entries.
///
/// ```
/// use std::collections::BTreeMap;
/// use pbb_error::template::render_template;
///
/// let ctx = BTreeMap::from([("name".to_string(), serde_json::json!("Order"))]);
/// assert_eq!(render_template("missing '{name}' {id}", &ctx), "missing 'Order' {id}");
/// ```
pub fn render_template(template: &str, context: &BTreeMap<String, Value>) -> String {
    if context.is_empty() {
        return template.to_string();
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        // Restart at the next '{' so "{{key}" still renders the inner placeholder.
        let Some(close) = after.find(['{', '}']).filter(|&i| after.as_bytes()[i] == b'}') else {
            out.push('{');
            rest = after;
            continue;
        };
        let name = &after[..close];
        match context.get(name) {
            Some(value) => out.push_str(&value_text(value)),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// String form of a context value as it appears inside a message.
///
/// JSON strings are inserted without quotes and `null` becomes the empty
/// string; every other value uses its compact JSON text.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Names of the `{placeholder}`s found in `template`, in order of first
/// appearance and without duplicates.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found: Vec<&str> = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = &after[..close];
        if !name.is_empty() && !name.contains('{') && !found.contains(&name) {
            found.push(name);
        }
        rest = &after[close + 1..];
    }
    found
}
