//! Parquet encoding
//!
//! Data files are encoded fully in memory and uploaded in one `put`.

use crate::error::{Error, Result};
use crate::types::Compression as CompressionCodec;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
        }
    }
}

impl ParquetWriterConfig {
    /// Config for a configured codec
    #[must_use]
    pub fn for_codec(codec: CompressionCodec) -> Self {
        let compression = match codec {
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionCodec::Gzip => Compression::GZIP(GzipLevel::default()),
            CompressionCodec::None => Compression::UNCOMPRESSED,
        };
        Self::default().with_compression(compression)
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Encode a RecordBatch as a complete Parquet file
pub fn encode_parquet(batch: &RecordBatch, config: &ParquetWriterConfig) -> Result<Bytes> {
    let mut buffer = Vec::new();
    let props = config.build_properties();

    let mut writer =
        ArrowWriter::try_new(&mut buffer, batch.schema(), Some(props)).map_err(|e| {
            Error::output(format!("Failed to create Parquet writer: {e}"))
        })?;
    writer
        .write(batch)
        .map_err(|e| Error::output(format!("Failed to write batch: {e}")))?;
    writer
        .close()
        .map_err(|e| Error::output(format!("Failed to close Parquet writer: {e}")))?;

    Ok(Bytes::from(buffer))
}
