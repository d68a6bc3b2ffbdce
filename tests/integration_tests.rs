//! Integration tests using a mock Socrata server
//!
//! Tests the full end-to-end flow: SODA pages → dimensions and fact →
//! Delta tables on the local filesystem

use bytes::Bytes;
use clap::Parser;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use secop_warehouse::cli::{Cli, Runner};
use secop_warehouse::config::SourceConfig;
use secop_warehouse::engine::{Pipeline, PipelineConfig};
use secop_warehouse::error::Error;
use secop_warehouse::output::{batch_to_records, CloudDestination, DeltaSink, DeltaTable};
use secop_warehouse::source::SocrataSource;
use secop_warehouse::types::{Compression, Record};
use secop_warehouse::warehouse::{DIMENSIONS, FACT};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const RESOURCE: &str = "/resource/jbjy-vk9h.json";

/// Serves a fixed contract dataset the way SODA does: `$select` projects,
/// `$group` keeps one row per group value, `$limit`/`$offset` page.
struct SodaResponder {
    rows: Vec<Value>,
}

impl Respond for SodaResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let param = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };

        let select: Vec<String> = param("$select")
            .unwrap_or_default()
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        let group = param("$group");
        let limit: usize = param("$limit").and_then(|v| v.parse().ok()).unwrap_or(1000);
        let offset: usize = param("$offset").and_then(|v| v.parse().ok()).unwrap_or(0);

        let mut seen = HashSet::new();
        let page: Vec<Value> = self
            .rows
            .iter()
            .filter(|row| match &group {
                Some(g) => seen.insert(row.get(g).cloned().unwrap_or(Value::Null).to_string()),
                None => true,
            })
            .map(|row| {
                let projected: Map<String, Value> = select
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect();
                Value::Object(projected)
            })
            .skip(offset)
            .take(limit)
            .collect();

        ResponseTemplate::new(200).set_body_json(page)
    }
}

fn contract(i: usize, nit: &str, departamento: &str, ciudad: &str, fecha: &str) -> Value {
    json!({
        "id_contrato": format!("CO1.PCCNTR.{i}"),
        "nit_entidad": nit,
        "nombre_entidad": format!("Entidad {nit}"),
        "departamento": departamento,
        "ciudad": ciudad,
        "orden": "Territorial",
        "documento_proveedor": format!("10{}", i % 2),
        "proveedor_adjudicado": format!("Proveedor {}", i % 2),
        "es_pyme": "Si",
        "tipo_modalidad_contrato": "Contratación directa",
        "fecha_de_firma": fecha,
        "estado_contrato": "En ejecución",
        "tipo_pago": "Transferencia",
        "categoria": "Servicios",
        "valor_contrato": format!("{}", 1_000_000 * (i + 1)),
        "valor_pagado": "0",
        "dias_adicionados": "0"
    })
}

fn dataset() -> Vec<Value> {
    vec![
        contract(0, "890900286", "Antioquia", "Medellín", "2023-05-10T00:00:00.000"),
        contract(1, "899999061", "Distrito Capital de Bogotá", "Bogotá", "2023-05-10T00:00:00.000"),
        contract(2, "890900286", "Antioquia", "Medellín", "2024-02-29T00:00:00.000"),
        contract(3, "891380033", "Valle del Cauca", "Cali", "2023-12-01T00:00:00.000"),
        json!({"id_contrato": "CO1.PCCNTR.4", "valor_contrato": "", "valor_pagado": "5"}),
    ]
}

async fn mock_socrata(rows: Vec<Value>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(SodaResponder { rows })
        .mount(&server)
        .await;
    server
}

fn source_config(server: &MockServer, page_size: u32) -> SourceConfig {
    SourceConfig {
        base_url: Some(server.uri()),
        page_size,
        ..Default::default()
    }
}

fn read_active_rows(dir: &Path, snapshot_file: &str, table_path: &str) -> Vec<Record> {
    let data = std::fs::read(dir.join(table_path).join(snapshot_file)).unwrap();
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(data))
        .unwrap()
        .build()
        .unwrap();
    reader
        .flat_map(|batch| batch_to_records(&batch.unwrap()).unwrap())
        .collect()
}

async fn active_file(dir: &Path, table_path: &str) -> String {
    let dest = CloudDestination::parse(dir.to_str().unwrap()).unwrap();
    let snapshot = DeltaTable::new(dest, table_path).snapshot().await.unwrap();
    assert_eq!(snapshot.files.len(), 1, "{table_path}");
    snapshot.files.keys().next().unwrap().clone()
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_full_load_writes_every_delta_table() {
    let server = mock_socrata(dataset()).await;
    let dir = tempdir().unwrap();

    let config = source_config(&server, 2);
    let source = SocrataSource::new(&config).unwrap();
    let sink = DeltaSink::new(
        CloudDestination::parse(dir.path().to_str().unwrap()).unwrap(),
        Compression::Snappy,
    );

    let stats = Pipeline::new(&source, &sink)
        .with_config(PipelineConfig::from(&config))
        .run()
        .await
        .unwrap();

    for path in DIMENSIONS.iter().map(|d| d.path).chain([FACT.path]) {
        assert!(
            dir.path()
                .join(path)
                .join("_delta_log/00000000000000000000.json")
                .exists(),
            "missing commit for {path}"
        );
    }
    assert_eq!(stats.tables.len(), 14);
    assert!(stats.tables.iter().all(|t| t.version == Some(0)));

    let fact_file = active_file(dir.path(), FACT.path).await;
    assert!(fact_file.ends_with(".snappy.parquet"));
    let fact = read_active_rows(dir.path(), &fact_file, FACT.path);
    assert_eq!(fact.len(), 5);
    assert_eq!(fact[0]["id_entidad"], 1);
    assert_eq!(fact[2]["id_entidad"], 1);
    assert_eq!(fact[1]["id_geografia"], 2);
    assert_eq!(fact[0]["valor_contrato"], 1_000_000.0);
    assert_eq!(fact[4]["id_entidad"], Value::Null);
    assert_eq!(fact[4]["valor_contrato"], Value::Null);
    assert_eq!(fact[4]["valor_pagado"], 5.0);

    let time_file = active_file(dir.path(), "gold/dim/tiempo").await;
    let time = read_active_rows(dir.path(), &time_file, "gold/dim/tiempo");
    let keys: Vec<i64> = time.iter().map(|r| r["id_tiempo"].as_i64().unwrap()).collect();
    assert_eq!(keys, vec![1, 2, 3, 4]);
    assert_eq!(time[1]["dia_semana"], "Thursday");
    assert_eq!(time[1]["fecha_completa"], "2024-02-29T00:00:00+00:00");
    assert_eq!(time[3]["fecha_completa"], Value::Null);
}

#[tokio::test]
async fn test_pagination_requests() {
    let server = mock_socrata(dataset()).await;
    let dir = tempdir().unwrap();

    let config = source_config(&server, 2);
    let source = SocrataSource::new(&config).unwrap();
    let sink = DeltaSink::new(
        CloudDestination::parse(dir.path().to_str().unwrap()).unwrap(),
        Compression::Snappy,
    );
    Pipeline::new(&source, &sink)
        .with_config(PipelineConfig::from(&config))
        .run()
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let fact_offsets: Vec<String> = requests
        .iter()
        .filter(|r| {
            r.url
                .query_pairs()
                .any(|(k, v)| k == "$select" && v.starts_with("id_contrato"))
        })
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "$offset")
                .map(|(_, v)| v.into_owned())
        })
        .collect();
    // 5 records at page size 2
    assert_eq!(fact_offsets, vec!["0", "2", "4", "6"]);
    assert!(requests.iter().all(|r| r
        .url
        .query_pairs()
        .any(|(k, v)| k == "$limit" && v == "2")));
}

#[tokio::test]
async fn test_second_run_overwrites() {
    let server = mock_socrata(dataset()).await;
    let dir = tempdir().unwrap();

    let config = source_config(&server, 50_000);
    let source = SocrataSource::new(&config).unwrap();
    let sink = DeltaSink::new(
        CloudDestination::parse(dir.path().to_str().unwrap()).unwrap(),
        Compression::Snappy,
    );
    let pipeline = Pipeline::new(&source, &sink).with_config(PipelineConfig::from(&config));

    pipeline.run().await.unwrap();
    let first = active_file(dir.path(), "gold/dim/entidades").await;
    let stats = pipeline.run().await.unwrap();
    let second = active_file(dir.path(), "gold/dim/entidades").await;

    assert!(stats.tables.iter().all(|t| t.version == Some(1)));
    assert_ne!(first, second);

    let history = sink.table("gold/dim/entidades").history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].files_removed, 1);
    // three distinct NITs plus the row without one
    assert_eq!(history[1].records_added, 4);
}

#[tokio::test]
async fn test_api_error_aborts_before_writing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();

    let source = SocrataSource::new(&source_config(&server, 10)).unwrap();
    let sink = DeltaSink::new(
        CloudDestination::parse(dir.path().to_str().unwrap()).unwrap(),
        Compression::Snappy,
    );
    let err = Pipeline::new(&source, &sink).run().await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert!(!dir.path().join("gold").exists());
}

// ============================================================================
// CLI Tests
// ============================================================================

#[tokio::test]
async fn test_cli_run_and_history() {
    let server = mock_socrata(dataset()).await;
    let dir = tempdir().unwrap();
    let output = dir.path().to_str().unwrap();

    let cli = Cli::parse_from([
        "secop-warehouse",
        "run",
        "--base-url",
        &server.uri(),
        "--output",
        output,
        "--page-size",
        "3",
    ]);
    Runner::new(cli).run().await.unwrap();
    assert!(dir
        .path()
        .join("gold/facts/contratos/_delta_log/00000000000000000000.json")
        .exists());

    let cli = Cli::parse_from([
        "secop-warehouse",
        "history",
        "--table",
        "contratos",
        "--output",
        output,
    ]);
    Runner::new(cli).run().await.unwrap();
}

#[tokio::test]
async fn test_cli_missing_config_file() {
    let cli = Cli::parse_from([
        "secop-warehouse",
        "--config",
        "/nonexistent/warehouse.yaml",
        "run",
    ]);
    let err = Runner::new(cli).run().await.unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}
