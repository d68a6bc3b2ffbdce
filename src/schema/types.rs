//! Schema types

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Timezone attached to timestamp columns
pub const TIMESTAMP_TZ: &str = "UTC";

/// Logical column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Float64,
    /// UTF-8 string
    Utf8,
    /// Microsecond timestamp, UTC
    Timestamp,
}

impl ColumnType {
    /// Arrow data type for this column type
    pub fn to_arrow(self) -> DataType {
        match self {
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Utf8 => DataType::Utf8,
            ColumnType::Timestamp => {
                DataType::Timestamp(TimeUnit::Microsecond, Some(TIMESTAMP_TZ.into()))
            }
        }
    }

    /// Delta Lake primitive type name
    pub fn delta_type(self) -> &'static str {
        match self {
            ColumnType::Int64 => "long",
            ColumnType::Float64 => "double",
            ColumnType::Utf8 => "string",
            ColumnType::Timestamp => "timestamp",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Int64 => write!(f, "int64"),
            ColumnType::Float64 => write!(f, "float64"),
            ColumnType::Utf8 => write!(f, "utf8"),
            ColumnType::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Column type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether nulls are allowed
    pub nullable: bool,
}

impl ColumnDef {
    /// Nullable column
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
        }
    }

    /// Non-nullable column
    pub fn required(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
        }
    }

    /// Nullable string column
    pub fn utf8(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Utf8)
    }

    /// Arrow field for this column
    pub fn to_arrow(&self) -> Field {
        Field::new(&self.name, self.column_type.to_arrow(), self.nullable)
    }
}

/// Ordered column list of a warehouse table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Columns in output order
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Create a schema from columns
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Column names in order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Arrow schema with the same column order
    pub fn to_arrow(&self) -> Arc<Schema> {
        Arc::new(Schema::new(
            self.columns
                .iter()
                .map(ColumnDef::to_arrow)
                .collect::<Vec<_>>(),
        ))
    }

    /// Delta `schemaString` (a JSON-encoded struct type)
    pub fn to_delta_schema_string(&self) -> String {
        let fields: Vec<_> = self
            .columns
            .iter()
            .map(|c| {
                json!({
                    "name": c.name,
                    "type": c.column_type.delta_type(),
                    "nullable": c.nullable,
                    "metadata": {},
                })
            })
            .collect();
        json!({ "type": "struct", "fields": fields }).to_string()
    }
}
