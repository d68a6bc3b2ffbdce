//! CLI module
//!
//! Command-line interface for the warehouse builder.
//!
//! # Commands
//!
//! - `run` - Extract, build and overwrite every table
//! - `tables` - Print the table catalog
//! - `history` - Show the commit history of a table

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{resolve_table_path, RunOverrides, Runner};
