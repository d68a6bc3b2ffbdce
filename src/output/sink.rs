//! Table sinks

use super::cloud::CloudDestination;
use super::delta::DeltaTable;
use super::schema::records_to_batch;
use super::writer::{encode_parquet, ParquetWriterConfig};
use crate::config::OutputConfig;
use crate::error::Result;
use crate::types::Compression;
use crate::warehouse::Table;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// Result of writing one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    /// Table name
    pub table: String,
    /// Table path in the store
    pub path: String,
    /// Committed version
    pub version: u64,
    /// Rows written
    pub rows: usize,
    /// Data file relative to the table root
    pub data_file: String,
    /// Files removed by the overwrite
    pub files_removed: usize,
}

/// Destination of built tables
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Replace the content of `table.path` with `table.rows`
    async fn write_table(&self, table: &Table) -> Result<WriteOutcome>;
}

/// Writes tables as Delta tables in overwrite mode
#[derive(Debug, Clone)]
pub struct DeltaSink {
    destination: CloudDestination,
    compression: Compression,
    writer_config: ParquetWriterConfig,
}

impl DeltaSink {
    /// Create a sink over a destination
    pub fn new(destination: CloudDestination, compression: Compression) -> Self {
        Self {
            destination,
            compression,
            writer_config: ParquetWriterConfig::for_codec(compression),
        }
    }

    /// Create a sink from output configuration
    pub fn from_config(config: &OutputConfig) -> Result<Self> {
        let destination = CloudDestination::parse(&config.destination)?;
        Ok(Self::new(destination, config.compression))
    }

    /// The underlying destination
    pub fn destination(&self) -> &CloudDestination {
        &self.destination
    }

    /// Delta table handle for a path
    pub fn table(&self, path: &str) -> DeltaTable {
        DeltaTable::new(self.destination.clone(), path)
    }
}

#[async_trait]
impl TableSink for DeltaSink {
    async fn write_table(&self, table: &Table) -> Result<WriteOutcome> {
        let batch = records_to_batch(&table.rows, &table.schema, &table.name)?;
        let data = encode_parquet(&batch, &self.writer_config)?;

        let commit = self
            .table(&table.path)
            .overwrite(&table.schema, data, batch.num_rows(), self.compression)
            .await?;

        info!(
            "Wrote {} rows to {} (version {})",
            batch.num_rows(),
            self.destination.display_path(&table.path),
            commit.version
        );

        Ok(WriteOutcome {
            table: table.name.clone(),
            path: table.path.clone(),
            version: commit.version,
            rows: batch.num_rows(),
            data_file: commit.data_file,
            files_removed: commit.files_removed,
        })
    }
}
