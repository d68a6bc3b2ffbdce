//! Tests for decoder module

use super::*;

#[test]
fn test_json_decoder_array() {
    let decoder = JsonDecoder::new();
    let body = r#"[{"nit_entidad": "800", "ciudad": "Bogotá"}, {"nit_entidad": "900"}]"#;
    let records = decoder.decode(body).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["ciudad"], "Bogotá");
    assert!(records[1].get("ciudad").is_none());
}

#[test]
fn test_json_decoder_empty_page() {
    let decoder = JsonDecoder::new();
    let records = decoder.decode("[]").unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_json_decoder_invalid_json() {
    let decoder = JsonDecoder::new();
    let err = decoder.decode("<html>").unwrap_err();
    assert!(err.to_string().contains("Failed to parse JSON"));
}

#[test]
fn test_json_decoder_api_error_object() {
    let decoder = JsonDecoder::new();
    let body = r#"{"error": true, "message": "No such column: foo"}"#;
    let err = decoder.decode(body).unwrap_err();
    assert!(err.to_string().contains("No such column: foo"));
}

#[test]
fn test_json_decoder_non_object_items() {
    let decoder = JsonDecoder::new();
    let err = decoder.decode(r#"[{"a": 1}, 2]"#).unwrap_err();
    assert!(err.to_string().contains("Expected object at index 1, found number"));
}

#[test]
fn test_json_decoder_scalar_body() {
    let decoder = JsonDecoder::new();
    let err = decoder.decode("42").unwrap_err();
    assert!(err.to_string().contains("found number"));
}
