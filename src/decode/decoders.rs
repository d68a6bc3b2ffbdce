//! Decoder implementations

use crate::error::{Error, Result};
use crate::types::Record;
use serde_json::Value;

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the response body into a list of records
    fn decode(&self, body: &str) -> Result<Vec<Record>>;
}

// ============================================================================
// JSON Decoder
// ============================================================================

/// Decoder for SODA JSON bodies
///
/// The body must be an array of objects. A top-level object carrying
/// `error` or `message` is reported as an API error.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Record>> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;

        match &value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| match item {
                    Value::Object(obj) => Ok(obj.clone()),
                    other => Err(Error::decode(format!(
                        "Expected object at index {idx}, found {}",
                        type_name(other)
                    ))),
                })
                .collect(),
            Value::Object(obj) if obj.contains_key("error") || obj.contains_key("message") => {
                let message = obj
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                Err(Error::decode(format!("API returned an error: {message}")))
            }
            other => Err(Error::decode(format!(
                "Expected an array of records, found {}",
                type_name(other)
            ))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
