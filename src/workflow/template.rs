//! Template variable substitution for action configs.
//!
//! Action strings may hold `{{dotted.path}}` tokens resolved against the
//! execution context. A token that cannot be resolved is left literally
//! unchanged in the output, never blanked.

use regex::Regex;
use serde_json::Value;

use crate::runtime::ExecutionContext;

/// Regex pattern for template variables
/// Format: `{{key}}` or `{{key.subkey}}`
const VARIABLE_TEMPLATE_PATTERN: &str = r"\{\{\s*([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\s*\}\}";

/// Paths that resolve against the raw trigger payload when a direct
/// context lookup misses.
const ALIAS_PATHS: [&str; 10] = [
    "product.name",
    "product.stock",
    "product.id",
    "store.name",
    "store.id",
    "movement.type",
    "movement.quantity",
    "movement.id",
    "user.name",
    "user.email",
];

/// Replace every resolvable `{{dotted.path}}` token in `template`.
pub fn replace_variables(
    ctx: &ExecutionContext,
    template: &str,
) -> String {
    let re = Regex::new(VARIABLE_TEMPLATE_PATTERN).unwrap();
    let mut result = template.to_string();

    for caps in re.captures_iter(template) {
        let full_match = &caps[0];
        let path = &caps[1];

        if let Some(value) = resolve_path(ctx, path) {
            result = result.replace(full_match, &value);
        }
    }

    result
}

fn resolve_path(
    ctx: &ExecutionContext,
    path: &str,
) -> Option<String> {
    if let Some(value) = ctx.lookup(path) {
        return value_to_string(value);
    }

    // Alias fallback for payloads that only carry entities under the raw
    // trigger data.
    if ALIAS_PATHS.contains(&path) {
        if let Some(value) = ctx.lookup(&format!("trigger.data.{}", path)) {
            return value_to_string(value);
        }
    }

    None
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        v => Some(v.to_string()), // For objects/arrays, use JSON string
    }
}
