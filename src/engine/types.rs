//! Engine types
//!
//! Configuration and run statistics for the warehouse pipeline.

use crate::config::{SourceConfig, DEFAULT_PAGE_SIZE};
use crate::warehouse::Table;
use serde::Serialize;

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Records per page
    pub page_size: u32,
    /// SoQL filter AND-ed into every extraction
    pub filter: Option<String>,
    /// Stop each extraction after this many records
    pub max_records: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            filter: None,
            max_records: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new pipeline config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the global filter
    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Set max records per extraction
    #[must_use]
    pub fn with_max_records(mut self, max: Option<u64>) -> Self {
        self.max_records = max;
        self
    }
}

impl From<&SourceConfig> for PipelineConfig {
    fn from(source: &SourceConfig) -> Self {
        Self::new()
            .with_page_size(source.page_size)
            .with_filter(source.filter.clone())
            .with_max_records(source.max_records)
    }
}

/// The built star schema
#[derive(Debug, Clone)]
pub struct StarSchema {
    /// Dimensions in catalog order
    pub dimensions: Vec<Table>,
    /// The fact table
    pub fact: Table,
}

impl StarSchema {
    /// Tables in write order: fact first, then dimensions
    pub fn write_order(&self) -> impl Iterator<Item = &Table> {
        std::iter::once(&self.fact).chain(self.dimensions.iter())
    }
}

/// Per-table summary of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    /// Table name
    pub name: String,
    /// Table path
    pub path: String,
    /// Rows built
    pub rows: usize,
    /// Records extracted for this table (0 when derived)
    pub records_extracted: usize,
    /// Page requests issued (0 when derived)
    pub pages: u64,
    /// Committed version, once written
    pub version: Option<u64>,
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Tables in build order
    pub tables: Vec<TableSummary>,
    /// Total records extracted
    pub records_extracted: usize,
    /// Total page requests
    pub pages_fetched: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a built table
    pub fn add_table(&mut self, table: &Table, records_extracted: usize, pages: u64) {
        self.records_extracted += records_extracted;
        self.pages_fetched += pages;
        self.tables.push(TableSummary {
            name: table.name.clone(),
            path: table.path.clone(),
            rows: table.num_rows(),
            records_extracted,
            pages,
            version: None,
        });
    }

    /// Record the committed version of a table
    pub fn set_version(&mut self, name: &str, version: u64) {
        if let Some(summary) = self.tables.iter_mut().find(|t| t.name == name) {
            summary.version = Some(version);
        }
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
