//! Tests for engine module

use super::*;
use crate::output::WriteOutcome;
use crate::types::{field_text, Record};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory Socrata stand-in: projects, groups and pages a fixed dataset
struct DatasetSource {
    rows: Vec<Record>,
    queries: Mutex<Vec<SoqlQuery>>,
}

impl DatasetSource {
    fn new(rows: Vec<Record>) -> Self {
        Self {
            rows,
            queries: Mutex::new(Vec::new()),
        }
    }

    fn queries(&self) -> Vec<SoqlQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataSource for DatasetSource {
    async fn fetch_page(
        &self,
        query: &SoqlQuery,
        limit: u32,
        offset: u64,
    ) -> crate::Result<Vec<Record>> {
        self.queries.lock().unwrap().push(query.clone());

        let mut seen = HashSet::new();
        let projected: Vec<Record> = self
            .rows
            .iter()
            .filter(|row| match &query.group {
                Some(group) => seen.insert(field_text(row, group)),
                None => true,
            })
            .map(|row| {
                query
                    .select
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect()
            })
            .collect();

        Ok(projected
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

/// Sink keeping written tables in memory
#[derive(Default)]
struct MemorySink {
    written: Mutex<Vec<Table>>,
    versions: Mutex<HashMap<String, u64>>,
}

impl MemorySink {
    fn written(&self) -> Vec<Table> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl TableSink for MemorySink {
    async fn write_table(&self, table: &Table) -> crate::Result<WriteOutcome> {
        let version = {
            let mut versions = self.versions.lock().unwrap();
            let next = versions.get(&table.path).map_or(0, |v| v + 1);
            versions.insert(table.path.clone(), next);
            next
        };
        self.written.lock().unwrap().push(table.clone());
        Ok(WriteOutcome {
            table: table.name.clone(),
            path: table.path.clone(),
            version,
            rows: table.num_rows(),
            data_file: format!("part-{version}.parquet"),
            files_removed: usize::from(version > 0),
        })
    }
}

struct FailingSink;

#[async_trait]
impl TableSink for FailingSink {
    async fn write_table(&self, table: &Table) -> crate::Result<WriteOutcome> {
        Err(Error::output(format!("disk full writing {}", table.path)))
    }
}

fn summary<'a>(stats: &'a RunStats, name: &str) -> &'a TableSummary {
    stats.tables.iter().find(|t| t.name == name).unwrap()
}

fn contract(i: usize, nit: &str, city: (&str, &str), fecha: &str) -> Record {
    json!({
        "id_contrato": format!("CO1.PCCNTR.{i}"),
        "nit_entidad": nit,
        "nombre_entidad": format!("Entidad {nit}"),
        "departamento": city.0,
        "ciudad": city.1,
        "orden": "Territorial",
        "documento_proveedor": format!("P{}", i % 3),
        "proveedor_adjudicado": format!("Proveedor {}", i % 3),
        "es_pyme": "No",
        "tipo_modalidad_contrato": if i % 2 == 0 { "Contratación directa" } else { "Licitación pública" },
        "fecha_de_firma": fecha,
        "estado_contrato": "Activo",
        "tipo_pago": "Transferencia",
        "categoria": "Servicios",
        "valor_contrato": format!("{}", 1000 * (i + 1)),
        "valor_pagado": "0",
        "dias_adicionados": "0"
    })
    .as_object()
    .cloned()
    .unwrap()
}

fn dataset() -> Vec<Record> {
    vec![
        contract(0, "800", ("Antioquia", "Medellín"), "2023-05-10T00:00:00.000"),
        contract(1, "801", ("Antioquia", "Medellín"), "2023-05-10T00:00:00.000"),
        contract(2, "900", ("Bogotá D.C.", "Bogotá"), "2024-01-15T00:00:00.000"),
        contract(3, "800", ("Antioquia", "Medellín"), "2023-11-02T00:00:00.000"),
        contract(4, "950", ("Valle", "Cali"), "2024-01-15T00:00:00.000"),
    ]
}

// ============================================================================
// Query Tests
// ============================================================================

#[test]
fn test_dimension_query_uses_catalog() {
    let spec = crate::warehouse::dimension_spec("tipo_pago").unwrap();
    let query = dimension_query(spec);
    assert_eq!(
        query.select,
        vec!["tipo_pago", "permite_anticipos", "plazo_maximo_pago"]
    );
    assert_eq!(query.group.as_deref(), Some("tipo_pago"));

    let entities = crate::warehouse::dimension_spec("entidades").unwrap();
    assert_eq!(dimension_query(entities).group, None);
    assert_eq!(fact_query(&FACT).select.len(), 10);
}

#[test]
fn test_pipeline_config_from_source() {
    let source = crate::config::SourceConfig {
        page_size: 10,
        filter: Some("valor_contrato > 0".to_string()),
        max_records: Some(100),
        ..Default::default()
    };
    let config = PipelineConfig::from(&source);
    assert_eq!(config.page_size, 10);
    assert_eq!(config.filter.as_deref(), Some("valor_contrato > 0"));
    assert_eq!(config.max_records, Some(100));
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_run_builds_and_writes_every_table() {
    let source = DatasetSource::new(dataset());
    let sink = MemorySink::default();
    let pipeline =
        Pipeline::new(&source, &sink).with_config(PipelineConfig::new().with_page_size(2));

    let stats = pipeline.run().await.unwrap();

    let written = sink.written();
    assert_eq!(written.len(), 14);
    assert_eq!(written[0].path, "gold/facts/contratos");
    let paths: Vec<&str> = written[1..].iter().map(|t| t.path.as_str()).collect();
    let expected: Vec<&str> = DIMENSIONS.iter().map(|d| d.path).collect();
    assert_eq!(paths, expected);

    let fact = &written[0];
    assert_eq!(fact.num_rows(), 5);
    assert!(fact.column_i64("id_entidad").iter().all(Option::is_some));
    assert!(fact.column_i64("id_tiempo").iter().all(Option::is_some));
    assert!(fact.column_i64("id_geografia").iter().all(Option::is_some));

    let entities = summary(&stats, "entidades");
    assert_eq!(entities.rows, 4);
    assert_eq!(entities.records_extracted, 5);
    // 5 records at page size 2: offsets 0, 2, 4, 6
    assert_eq!(entities.pages, 4);
    assert_eq!(entities.version, Some(0));

    assert_eq!(summary(&stats, "geografia").rows, 3);
    assert_eq!(summary(&stats, "geografia").pages, 0);
    assert_eq!(summary(&stats, "tiempo").rows, 3);
    assert_eq!(summary(&stats, "contratos").rows, 5);
    assert_eq!(stats.tables.len(), 14);
}

#[tokio::test]
async fn test_geography_is_never_extracted() {
    let source = DatasetSource::new(dataset());
    let sink = MemorySink::default();
    Pipeline::new(&source, &sink).run().await.unwrap();

    let selects: HashSet<String> = source.queries().iter().map(SoqlQuery::select_clause).collect();
    // 12 extracted dimensions plus the fact table
    assert_eq!(selects.len(), 13);
    assert!(!selects.contains("departamento, ciudad"));
}

#[tokio::test]
async fn test_filter_attached_to_every_query() {
    let source = DatasetSource::new(dataset());
    let sink = MemorySink::default();
    let config = PipelineConfig::new().with_filter(Some("fecha_de_firma >= '2023-01-01'".into()));
    Pipeline::new(&source, &sink)
        .with_config(config)
        .run()
        .await
        .unwrap();

    assert!(source
        .queries()
        .iter()
        .all(|q| q.filter.as_deref() == Some("fecha_de_firma >= '2023-01-01'")));
}

#[tokio::test]
async fn test_unknown_entity_yields_null_key() {
    let mut rows = dataset();
    rows.push(contract(5, "123456", ("Amazonas", "Leticia"), "2022-02-02"));
    // Dimension extraction is capped at 5 records; the fact extraction sees all 6
    let source = DatasetSource::new(rows);
    let sink = MemorySink::default();
    let config = PipelineConfig::new().with_max_records(Some(5));
    let pipeline = Pipeline::new(&source, &sink).with_config(config);

    let mut stats = RunStats::new();
    let dimensions = pipeline.build_dimensions(&mut stats).await.unwrap();
    let fact = Pipeline::new(&source, &sink)
        .build_fact(&dimensions, &mut stats)
        .await
        .unwrap();

    assert_eq!(fact.num_rows(), 6);
    assert_eq!(fact.column_i64("id_entidad")[5], None);
    assert_eq!(fact.column_text("id_contrato")[5].as_deref(), Some("CO1.PCCNTR.5"));
}

#[tokio::test]
async fn test_rerun_overwrites() {
    let source = DatasetSource::new(dataset());
    let sink = MemorySink::default();
    let pipeline = Pipeline::new(&source, &sink);

    pipeline.run().await.unwrap();
    let stats = pipeline.run().await.unwrap();
    assert!(stats.tables.iter().all(|t| t.version == Some(1)));
}

#[tokio::test]
async fn test_empty_source_writes_empty_tables() {
    let source = DatasetSource::new(Vec::new());
    let sink = MemorySink::default();
    let stats = Pipeline::new(&source, &sink).run().await.unwrap();

    assert_eq!(sink.written().len(), 14);
    assert!(sink.written().iter().all(|t| t.num_rows() == 0));
    assert_eq!(stats.records_extracted, 0);
}

#[tokio::test]
async fn test_sink_error_aborts_run() {
    let source = DatasetSource::new(dataset());
    let err = Pipeline::new(&source, &FailingSink).run().await.unwrap_err();
    assert!(err.to_string().contains("gold/facts/contratos"));
}
