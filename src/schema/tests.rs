//! Tests for schema module

use super::*;
use arrow::datatypes::{DataType, TimeUnit};
use pretty_assertions::assert_eq;

fn sample_schema() -> TableSchema {
    TableSchema::new(vec![
        ColumnDef::required("id_tiempo", ColumnType::Int64),
        ColumnDef::new("fecha_completa", ColumnType::Timestamp),
        ColumnDef::new("valor", ColumnType::Float64),
        ColumnDef::utf8("dia_semana"),
    ])
}

#[test]
fn test_schema_names_and_lookup() {
    let schema = sample_schema();
    assert_eq!(
        schema.names(),
        vec!["id_tiempo", "fecha_completa", "valor", "dia_semana"]
    );
    assert_eq!(schema.len(), 4);
    assert!(!schema.is_empty());
    assert_eq!(
        schema.column("valor").map(|c| c.column_type),
        Some(ColumnType::Float64)
    );
    assert!(schema.column("missing").is_none());
}

#[test]
fn test_schema_to_arrow() {
    let arrow = sample_schema().to_arrow();
    assert_eq!(arrow.fields().len(), 4);

    let key = arrow.field(0);
    assert_eq!(key.name(), "id_tiempo");
    assert_eq!(key.data_type(), &DataType::Int64);
    assert!(!key.is_nullable());

    assert_eq!(
        arrow.field(1).data_type(),
        &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
    );
    assert!(arrow.field(3).is_nullable());
}

#[test]
fn test_delta_schema_string() {
    let schema_string = sample_schema().to_delta_schema_string();
    let parsed: serde_json::Value = serde_json::from_str(&schema_string).unwrap();

    assert_eq!(parsed["type"], "struct");
    let fields = parsed["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0]["name"], "id_tiempo");
    assert_eq!(fields[0]["type"], "long");
    assert_eq!(fields[0]["nullable"], false);
    assert_eq!(fields[1]["type"], "timestamp");
    assert_eq!(fields[2]["type"], "double");
    assert_eq!(fields[3]["type"], "string");
}

#[test]
fn test_column_type_display() {
    assert_eq!(ColumnType::Int64.to_string(), "int64");
    assert_eq!(ColumnType::Timestamp.to_string(), "timestamp");
}

#[test]
fn test_timestamp_zone_matches_arrow_type() {
    assert_eq!(TIMESTAMP_TZ, "UTC");
    assert_eq!(
        ColumnType::Timestamp.to_arrow(),
        DataType::Timestamp(TimeUnit::Microsecond, Some(crate::schema::TIMESTAMP_TZ.into()))
    );
}
