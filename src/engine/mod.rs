//! Execution engine module
//!
//! Orchestrates a full warehouse load.
//!
//! # Overview
//!
//! A run extracts and builds every dimension in catalog order, derives
//! geography from the entity dimension, builds the fact table against the
//! built dimensions, then overwrites every table in the sink (fact first).
//! Steps run sequentially and the first error aborts the run.

mod types;

pub use types::{PipelineConfig, RunStats, StarSchema, TableSummary};

use crate::error::{Error, Result};
use crate::output::TableSink;
use crate::source::{DataSource, Extractor, SoqlQuery};
use crate::warehouse::{
    build_dimension, build_fact, derive_geography, DimensionKind, DimensionSpec, FactSpec,
    Table, DIMENSIONS, FACT,
};
use std::time::Instant;
use tracing::info;

/// Extraction query for a dimension
pub fn dimension_query(spec: &DimensionSpec) -> SoqlQuery {
    let query = SoqlQuery::select(spec.select.iter().copied());
    match spec.group_by {
        Some(group) => query.with_group(group),
        None => query,
    }
}

/// Extraction query for the fact table
pub fn fact_query(spec: &FactSpec) -> SoqlQuery {
    SoqlQuery::select(spec.select.iter().copied())
}

/// Warehouse pipeline over a source and a sink
pub struct Pipeline<'a> {
    source: &'a dyn DataSource,
    sink: &'a dyn TableSink,
    config: PipelineConfig,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline with default configuration
    pub fn new(source: &'a dyn DataSource, sink: &'a dyn TableSink) -> Self {
        Self {
            source,
            sink,
            config: PipelineConfig::default(),
        }
    }

    /// Set pipeline configuration
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn extractor(&self) -> Extractor<'a> {
        Extractor::new(self.source, self.config.page_size)
            .with_filter(self.config.filter.clone())
            .with_max_records(self.config.max_records)
    }

    /// Build every dimension in catalog order
    pub async fn build_dimensions(&self, stats: &mut RunStats) -> Result<Vec<Table>> {
        let extractor = self.extractor();
        let mut built: Vec<Table> = Vec::with_capacity(DIMENSIONS.len());

        for spec in &DIMENSIONS {
            let table = match spec.kind {
                DimensionKind::Geography => {
                    let entities = built
                        .iter()
                        .find(|t| t.name == "entidades")
                        .ok_or_else(|| {
                            Error::transform(spec.name, "entity dimension has not been built")
                        })?;
                    let table = derive_geography(spec, entities);
                    stats.add_table(&table, 0, 0);
                    table
                }
                DimensionKind::Extracted | DimensionKind::Time => {
                    let extraction = extractor.extract(&dimension_query(spec)).await?;
                    let extracted = extraction.records.len();
                    let table = build_dimension(spec, extraction.records)?;
                    stats.add_table(&table, extracted, extraction.pages);
                    table
                }
            };
            info!("Built dimension {} ({} rows)", table.name, table.num_rows());
            built.push(table);
        }

        Ok(built)
    }

    /// Extract raw fact rows and resolve foreign keys
    pub async fn build_fact(&self, dimensions: &[Table], stats: &mut RunStats) -> Result<Table> {
        let extraction = self.extractor().extract(&fact_query(&FACT)).await?;
        let extracted = extraction.records.len();
        let fact = build_fact(&FACT, extraction.records, dimensions)?;
        stats.add_table(&fact, extracted, extraction.pages);
        info!("Built fact {} ({} rows)", fact.name, fact.num_rows());
        Ok(fact)
    }

    /// Build the whole star schema without writing it
    pub async fn build(&self, stats: &mut RunStats) -> Result<StarSchema> {
        let dimensions = self.build_dimensions(stats).await?;
        let fact = self.build_fact(&dimensions, stats).await?;
        Ok(StarSchema { dimensions, fact })
    }

    /// Overwrite every table in the sink, fact first
    pub async fn write(&self, schema: &StarSchema, stats: &mut RunStats) -> Result<()> {
        for table in schema.write_order() {
            let outcome = self.sink.write_table(table).await?;
            stats.set_version(&table.name, outcome.version);
        }
        Ok(())
    }

    /// Build and write the warehouse
    pub async fn run(&self) -> Result<RunStats> {
        let start = Instant::now();
        let mut stats = RunStats::new();

        let schema = self.build(&mut stats).await?;
        self.write(&schema, &mut stats).await?;

        stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Warehouse load complete: {} tables, {} fact rows, {} records extracted in {} ms",
            stats.tables.len(),
            schema.fact.num_rows(),
            stats.records_extracted,
            stats.duration_ms
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests;
