//! Output module
//!
//! Turns built tables into Delta tables.
//!
//! # Overview
//!
//! - Converting rows to Arrow RecordBatches using the table schema
//! - Encoding Parquet data files
//! - Storage destinations (local, S3, R2, GCS, Azure)
//! - The Delta transaction log (overwrite commits, snapshots, history)

mod cloud;
mod delta;
mod schema;
mod sink;
mod writer;

pub use cloud::{CloudDestination, CreateOutcome};
pub use delta::{
    commit_file_name, data_file_name, parse_commit, render_commit, Action, Add, CommitInfo,
    CommitResult, CommitSummary, DeltaTable, Metadata, Protocol, Remove, Snapshot, LOG_DIR,
};
pub use schema::{batch_to_records, records_to_batch};
pub use sink::{DeltaSink, TableSink, WriteOutcome};
pub use writer::{encode_parquet, ParquetWriterConfig};
