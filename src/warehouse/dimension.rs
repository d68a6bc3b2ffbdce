//! Dimension construction
//!
//! Rows flow through: (time expansion) -> projection -> natural-key
//! deduplication -> surrogate key assignment.

use super::catalog::{DimensionKind, DimensionSpec};
use super::table::Table;
use super::time::{parse_timestamp, TimeAttributes};
use crate::error::{Error, Result};
use crate::types::{field_text, JsonValue, Record};
use serde_json::json;
use std::collections::HashSet;

/// Natural-key tuple of a row; nulls are kept as `None`
pub fn natural_key(record: &Record, columns: &[&str]) -> Vec<Option<String>> {
    columns.iter().map(|c| field_text(record, c)).collect()
}

/// Keep only `columns`, filling missing ones with null
pub fn project(records: Vec<Record>, columns: &[&str]) -> Vec<Record> {
    records
        .into_iter()
        .map(|mut record| {
            columns
                .iter()
                .map(|c| {
                    let value = record.remove(*c).unwrap_or(JsonValue::Null);
                    ((*c).to_string(), value)
                })
                .collect()
        })
        .collect()
}

/// Drop rows whose natural key was already seen, preserving order
pub fn dedup_by_natural_key(records: Vec<Record>, columns: &[&str]) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(natural_key(record, columns)))
        .collect()
}

/// Add a dense 1-based surrogate key in row order
pub fn assign_surrogate_keys(records: Vec<Record>, key_column: &str) -> Vec<Record> {
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let mut keyed = Record::new();
            keyed.insert(key_column.to_string(), json!(idx as i64 + 1));
            keyed.extend(record);
            keyed
        })
        .collect()
}

/// Build an extracted or time dimension from its source records
pub fn build_dimension(spec: &DimensionSpec, records: Vec<Record>) -> Result<Table> {
    let records = match spec.kind {
        DimensionKind::Extracted => records,
        DimensionKind::Time => expand_time(spec, records)?,
        DimensionKind::Geography => {
            return Err(Error::transform(
                spec.name,
                "geography is derived from the entity dimension",
            ))
        }
    };
    Ok(finish(spec, records))
}

/// Derive the geography dimension from the entity dimension
pub fn derive_geography(spec: &DimensionSpec, entities: &Table) -> Table {
    finish(spec, entities.rows.clone())
}

fn finish(spec: &DimensionSpec, records: Vec<Record>) -> Table {
    let columns = spec.column_names();
    let rows = project(records, &columns);
    let rows = dedup_by_natural_key(rows, spec.natural_key);
    let rows = assign_surrogate_keys(rows, spec.key_column);
    Table::new(spec.name, spec.path, spec.schema(), rows)
}

fn expand_time(spec: &DimensionSpec, records: Vec<Record>) -> Result<Vec<Record>> {
    let source_column = spec.select.first().copied().unwrap_or("fecha_de_firma");
    records
        .iter()
        .map(|record| {
            let Some(raw) = field_text(record, source_column) else {
                return Ok(Record::new());
            };
            let ts = parse_timestamp(&raw).ok_or_else(|| {
                Error::transform(
                    spec.name,
                    format!("unparseable {source_column} value '{raw}'"),
                )
            })?;
            let attrs = TimeAttributes::from_timestamp(ts);
            let mut row = Record::new();
            row.insert("fecha_completa".into(), json!(attrs.canonical()));
            row.insert("anio".into(), json!(attrs.anio));
            row.insert("mes".into(), json!(attrs.mes));
            row.insert("trimestre".into(), json!(attrs.trimestre));
            row.insert("dia_semana".into(), json!(attrs.dia_semana));
            Ok(row)
        })
        .collect()
}
