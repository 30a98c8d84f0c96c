//! JSON value coercion (spec.md §4.1).
//!
//! Extracted envelope values (e.g. `api_request_data`, a CoAP `new_value`)
//! arrive as loosely-typed JSON. This normalizes them to the shapes the rest
//! of the pipeline expects: strings pass through (empty → null), numbers are
//! stringified, maps and lists are re-serialized to a JSON string, and
//! anything else becomes a `{"type": "<typename>"}` diagnostic rather than a
//! decode failure.

use serde_json::{Value, json};

pub fn coerce(value: &Value) -> Value {
    match value {
        Value::String(s) if s.is_empty() => Value::Null,
        Value::String(s) => Value::String(s.clone()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Object(_) | Value::Array(_) => match serde_json::to_string(value) {
            Ok(s) => Value::String(s),
            Err(_) => json!({"type": type_name(value)}),
        },
        other => json!({"type": type_name(other)}),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
