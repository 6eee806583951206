//! Turns whatever JSON the agent sends back into a single display string.

use serde_json::{Map, Value};

/// Prefix put in front of error text so it stands out in the transcript.
pub const WARNING_MARKER: &str = "⚠️";

/// Reply used when the response has no shape we know how to read.
pub const UNRECOGNIZED_RESPONSE: &str = "I received an unexpected response format from the backend.";

/// Keys that may carry the reply text, in priority order.
const REPLY_KEYS: [&str; 4] = ["response", "answer", "message", "content"];

/// Boundary view of a decoded response body.
#[derive(Debug, Clone, Copy)]
pub enum ResponseShape<'a> {
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
    Scalar,
    Null,
}

impl<'a> From<&'a Value> for ResponseShape<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => ResponseShape::Object(map),
            Value::Array(items) => ResponseShape::Array(items),
            Value::Null => ResponseShape::Null,
            _ => ResponseShape::Scalar,
        }
    }
}

/// Extract the reply to show for an agent response.
///
/// Objects are read for an `error` string first, then for the first
/// string-valued reply key. Arrays are scanned for the first object that
/// yields something. When nothing matches, objects and non-empty arrays
/// fall back to their literal rendering; everything else gets
/// [`UNRECOGNIZED_RESPONSE`].
pub fn normalize(value: &Value) -> String {
    match ResponseShape::from(value) {
        ResponseShape::Object(map) => {
            extract_from_object(map).unwrap_or_else(|| render_literal(value))
        }
        ResponseShape::Array([]) => UNRECOGNIZED_RESPONSE.to_string(),
        ResponseShape::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .find_map(extract_from_object)
            .unwrap_or_else(|| render_literal(&items[0])),
        ResponseShape::Scalar | ResponseShape::Null => UNRECOGNIZED_RESPONSE.to_string(),
    }
}

fn extract_from_object(map: &Map<String, Value>) -> Option<String> {
    if let Some(error) = map.get("error").and_then(Value::as_str) {
        return Some(format!("{} {}", WARNING_MARKER, error));
    }

    REPLY_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn render_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
