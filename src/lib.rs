// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # SECOP Warehouse
//!
//! Builds a star-schema warehouse from the SECOP II public procurement
//! dataset published on Colombia's open data portal (Socrata).
//!
//! ## Features
//!
//! - **Paginated extraction**: `$limit`/`$offset` paging over the SODA API
//! - **Thirteen dimensions**: dense 1-based surrogate keys, natural-key deduplication
//! - **Contracts fact**: foreign keys resolved with left-join semantics
//! - **Delta output**: Parquet data files plus a JSON transaction log, local or cloud
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use secop_warehouse::config::WarehouseConfig;
//! use secop_warehouse::engine::{Pipeline, PipelineConfig};
//! use secop_warehouse::output::DeltaSink;
//! use secop_warehouse::source::SocrataSource;
//!
//! #[tokio::main]
//! async fn main() -> secop_warehouse::Result<()> {
//!     let config = WarehouseConfig::default();
//!     let source = SocrataSource::new(&config.source)?;
//!     let sink = DeltaSink::from_config(&config.output)?;
//!
//!     let stats = Pipeline::new(&source, &sink)
//!         .with_config(PipelineConfig::from(&config.source))
//!         .run()
//!         .await?;
//!     println!("{} records extracted", stats.records_extracted);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ SocrataSource│──▶│ Extractor  │──▶│  warehouse  │──▶│  DeltaSink   │
//! │ HTTP + decode│   │ offset/limit│  │ dims + fact │   │ Arrow/Parquet│
//! └──────────────┘   └────────────┘   └─────────────┘   │ + _delta_log │
//!                                                        └──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Warehouse configuration
pub mod config;

/// HTTP client
pub mod http;

/// Offset pagination
pub mod pagination;

/// Response decoders
pub mod decode;

/// Socrata source and paginated extractor
pub mod source;

/// Table schemas
pub mod schema;

/// Star-schema model: catalog, dimensions, fact
pub mod warehouse;

/// Arrow/Parquet/Delta output
pub mod output;

/// Pipeline engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::WarehouseConfig;
pub use engine::{Pipeline, PipelineConfig, RunStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
