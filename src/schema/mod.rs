//! Table schema module
//!
//! Typed column definitions shared by the warehouse model and the writer.
//!
//! # Features
//!
//! - **Column types**: `Int64`, `Float64`, `Utf8` and UTC `Timestamp`
//! - **Arrow mapping**: `TableSchema::to_arrow` for RecordBatch construction
//! - **Delta mapping**: `TableSchema::to_delta_schema_string` for table metadata

mod types;

pub use types::{ColumnDef, ColumnType, TableSchema, TIMESTAMP_TZ};

#[cfg(test)]
mod tests;
