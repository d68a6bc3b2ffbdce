//! Record to Arrow conversion
//!
//! Converts warehouse rows into a `RecordBatch` shaped by the table schema.
//! Socrata returns every scalar as a JSON string, so numeric and timestamp
//! columns are coerced here.

use crate::error::{Error, Result};
use crate::schema::{ColumnDef, ColumnType, TableSchema};
use crate::types::{JsonValue, Record};
use crate::warehouse::parse_timestamp;
use arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use serde_json::{json, Value};
use std::sync::Arc;

/// Convert rows to a RecordBatch with the columns of `schema`, in order
///
/// Missing fields and empty strings become null. A value that cannot be
/// coerced to its column type is an error naming the table and column.
pub fn records_to_batch(
    records: &[Record],
    schema: &TableSchema,
    table: &str,
) -> Result<RecordBatch> {
    let arrow_schema = schema.to_arrow();
    if records.is_empty() {
        return Ok(RecordBatch::new_empty(arrow_schema));
    }

    let columns = schema
        .columns
        .iter()
        .map(|column| {
            let values: Vec<Option<&Value>> = records
                .iter()
                .map(|r| r.get(&column.name).filter(|v| !is_blank(v)))
                .collect();
            build_array(&values, column, table)
        })
        .collect::<Result<Vec<_>>>()?;

    RecordBatch::try_new(arrow_schema, columns).map_err(|e| {
        Error::output(format!("Failed to create RecordBatch for '{table}': {e}"))
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn coercion_error(table: &str, column: &ColumnDef, value: &Value) -> Error {
    Error::transform(
        table,
        format!(
            "cannot convert {value} to {} in column '{}'",
            column.column_type, column.name
        ),
    )
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                // "3.0" style integers
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_micros(value: &Value) -> Option<i64> {
    value
        .as_str()
        .and_then(parse_timestamp)
        .map(|ts| ts.and_utc().timestamp_micros())
}

fn coerce_all<T>(
    values: &[Option<&Value>],
    column: &ColumnDef,
    table: &str,
    coerce: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    values
        .iter()
        .map(|v| match v {
            None => Ok(None),
            Some(v) => coerce(v)
                .map(Some)
                .ok_or_else(|| coercion_error(table, column, v)),
        })
        .collect()
}

fn build_array(values: &[Option<&Value>], column: &ColumnDef, table: &str) -> Result<ArrayRef> {
    let array: ArrayRef = match column.column_type {
        ColumnType::Int64 => Arc::new(Int64Array::from(coerce_all(
            values, column, table, coerce_i64,
        )?)),
        ColumnType::Float64 => Arc::new(Float64Array::from(coerce_all(
            values, column, table, coerce_f64,
        )?)),
        ColumnType::Utf8 => Arc::new(
            values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect::<StringArray>(),
        ),
        ColumnType::Timestamp => Arc::new(
            TimestampMicrosecondArray::from(coerce_all(values, column, table, coerce_micros)?)
                .with_timezone(crate::schema::TIMESTAMP_TZ),
        ),
    };

    if !column.nullable && array.null_count() > 0 {
        return Err(Error::transform(
            table,
            format!("null value in required column '{}'", column.name),
        ));
    }
    Ok(array)
}

/// Convert a RecordBatch back to rows
///
/// Timestamps are rendered as RFC 3339 text.
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<Record>> {
    let schema = batch.schema();
    let mut records = Vec::with_capacity(batch.num_rows());

    for row in 0..batch.num_rows() {
        let mut record = Record::new();
        for (idx, field) in schema.fields().iter().enumerate() {
            let value = array_value(batch.column(idx).as_ref(), row)?;
            record.insert(field.name().clone(), value);
        }
        records.push(record);
    }
    Ok(records)
}

fn array_value(array: &dyn Array, row: usize) -> Result<JsonValue> {
    if array.is_null(row) {
        return Ok(JsonValue::Null);
    }

    let unsupported = || Error::output(format!("Unsupported column type {}", array.data_type()));
    match array.data_type() {
        DataType::Int64 => array
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| json!(a.value(row)))
            .ok_or_else(unsupported),
        DataType::Float64 => array
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(|a| json!(a.value(row)))
            .ok_or_else(unsupported),
        DataType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| json!(a.value(row)))
            .ok_or_else(unsupported),
        DataType::Timestamp(TimeUnit::Microsecond, _) => array
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .and_then(|a| chrono::DateTime::from_timestamp_micros(a.value(row)))
            .map(|ts| json!(ts.to_rfc3339()))
            .ok_or_else(unsupported),
        _ => Err(unsupported()),
    }
}
