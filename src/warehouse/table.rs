//! In-memory warehouse table

use crate::schema::TableSchema;
use crate::types::Record;

/// A fully built dimension or fact table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Short table name (e.g. "entidades")
    pub name: String,
    /// Logical path in the table store (e.g. "gold/dim/entidades")
    pub path: String,
    /// Output schema
    pub schema: TableSchema,
    /// Rows; columns not in the schema are ignored on write
    pub rows: Vec<Record>,
}

impl Table {
    /// Create a table
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        schema: TableSchema,
        rows: Vec<Record>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            schema,
            rows,
        }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
impl Table {
    /// Values of one column rendered as text
    pub(crate) fn column_text(&self, column: &str) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|r| crate::types::field_text(r, column))
            .collect()
    }

    /// Values of one integer column (surrogate and foreign keys)
    pub(crate) fn column_i64(&self, column: &str) -> Vec<Option<i64>> {
        self.rows
            .iter()
            .map(|r| r.get(column).and_then(serde_json::Value::as_i64))
            .collect()
    }
}
