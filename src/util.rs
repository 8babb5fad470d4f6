use serde_json::Value;

/// Inline display form of a JSON value: strings bare, everything else
/// compact JSON.
pub fn inline_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Display form for values usable as identifiers; structures are rejected.
pub fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
