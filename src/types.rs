//! Common types used throughout SECOP Warehouse
//!
//! This module contains shared type definitions, type aliases,
//! and small value helpers used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// A single source or warehouse row, keyed by column name
pub type Record = serde_json::Map<String, JsonValue>;

// ============================================================================
// Value Helpers
// ============================================================================

/// Render a JSON value as text for keys and string columns
///
/// Returns `None` for nulls. Strings are returned verbatim, other scalars
/// use their JSON representation.
pub fn value_as_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Look up a column in a record and render it as text
pub fn field_text(record: &Record, column: &str) -> Option<String> {
    record.get(column).and_then(value_as_text)
}

// ============================================================================
// Compression
// ============================================================================

/// Parquet compression codec for data files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Snappy (Spark's default for Delta tables)
    #[default]
    Snappy,
    /// Zstandard
    Zstd,
    /// Gzip
    Gzip,
    /// No compression
    None,
}

impl Compression {
    /// File name infix used in data file names (e.g. `snappy`)
    pub fn file_infix(self) -> Option<&'static str> {
        match self {
            Compression::Snappy => Some("snappy"),
            Compression::Zstd => Some("zstd"),
            Compression::Gzip => Some("gz"),
            Compression::None => None,
        }
    }
}
