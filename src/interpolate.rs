//! Variable placeholder substitution
//!
//! A placeholder is a variable name wrapped in the delimiter on both sides,
//! e.g. ``` ``name`` ``` with the default delimiter. Placeholders whose name
//! is not in the mapping are left untouched.

use std::collections::HashMap;

use serde_json::Value;

use crate::variables::render_value;

/// Default placeholder delimiter
pub const DEFAULT_DELIMITER: &str = "``";

/// Replace every known placeholder in `template`
pub fn interpolate(template: &str, variables: &HashMap<String, Value>, delimiter: &str) -> String {
    if delimiter.is_empty() || !template.contains(delimiter) {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find(delimiter) {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + delimiter.len()..];

        let Some(close) = after_open.find(delimiter) else {
            // No closing delimiter; nothing further can match
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after_open[..close];
        match variables.get(name) {
            Some(value) if !name.is_empty() => {
                out.push_str(&render_value(value));
                rest = &after_open[close + delimiter.len()..];
            }
            _ => {
                // Keep the opening delimiter and rescan from just past it, so
                // the closing delimiter can still open a later placeholder
                out.push_str(delimiter);
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}
