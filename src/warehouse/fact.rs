//! Fact construction
//!
//! Foreign keys are resolved with left-join semantics: a fact row is never
//! dropped or duplicated, and a row without a match carries a null key.

use super::catalog::{FactSpec, ForeignKeyJoin, KeyNormalization};
use super::dimension::project;
use super::table::Table;
use super::time::normalize_timestamp;
use crate::error::{Error, Result};
use crate::types::{field_text, JsonValue, Record};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

/// Natural key -> surrogate key lookup over one dimension
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    index: HashMap<Vec<String>, i64>,
}

impl KeyIndex {
    /// Index `table` by `columns`; rows with a null key component are skipped
    pub fn build(table: &Table, columns: &[&str], key_column: &str) -> Result<Self> {
        let mut index = HashMap::with_capacity(table.num_rows());
        for row in &table.rows {
            let surrogate = row
                .get(key_column)
                .and_then(JsonValue::as_i64)
                .ok_or_else(|| {
                    Error::transform(&table.name, format!("row without '{key_column}'"))
                })?;
            if let Some(key) = text_key(row, columns) {
                index.entry(key).or_insert(surrogate);
            }
        }
        Ok(Self { index })
    }

    /// Surrogate key for a natural key
    pub fn lookup(&self, key: &[String]) -> Option<i64> {
        self.index.get(key).copied()
    }

    /// Number of distinct natural keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn text_key(record: &Record, columns: &[&str]) -> Option<Vec<String>> {
    columns.iter().map(|c| field_text(record, c)).collect()
}

fn fact_key(
    record: &Record,
    join: &ForeignKeyJoin,
    fact_name: &str,
) -> Result<Option<Vec<String>>> {
    let Some(key) = text_key(record, join.fact_columns) else {
        return Ok(None);
    };
    match join.normalization {
        KeyNormalization::Text => Ok(Some(key)),
        KeyNormalization::Timestamp => key
            .iter()
            .map(|raw| {
                normalize_timestamp(raw).ok_or_else(|| {
                    Error::transform(
                        fact_name,
                        format!("unparseable {} value '{raw}'", join.fact_columns.join(", ")),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
    }
}

/// Resolve one join over all rows, writing `join.key_column`
fn resolve_join(
    rows: &mut [Record],
    join: &ForeignKeyJoin,
    dimension: &Table,
    fact_name: &str,
) -> Result<usize> {
    let index = KeyIndex::build(dimension, join.dimension_columns, join.key_column)?;
    debug!("Indexed {} natural keys of {}", index.len(), dimension.name);
    let mut matched = 0;
    for row in rows.iter_mut() {
        let surrogate = fact_key(row, join, fact_name)?.and_then(|key| index.lookup(&key));
        if surrogate.is_some() {
            matched += 1;
        }
        row.insert(
            join.key_column.to_string(),
            surrogate.map_or(JsonValue::Null, |k| json!(k)),
        );
    }
    Ok(matched)
}

/// Build the fact table from raw fact rows and the built dimensions
pub fn build_fact(spec: &FactSpec, mut rows: Vec<Record>, dimensions: &[Table]) -> Result<Table> {
    for join in spec.joins {
        let dimension = dimensions
            .iter()
            .find(|t| t.name == join.dimension)
            .ok_or_else(|| {
                Error::transform(
                    spec.name,
                    format!("dimension '{}' has not been built", join.dimension),
                )
            })?;
        let matched = resolve_join(&mut rows, join, dimension, spec.name)?;
        debug!(
            "Resolved {} -> {}: {matched}/{} rows matched",
            join.key_column,
            join.dimension,
            rows.len()
        );
    }

    let schema = spec.schema();
    let rows = project(rows, &schema.names());
    Ok(Table::new(spec.name, spec.path, schema, rows))
}
