//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SECOP II star-schema warehouse builder
#[derive(Parser, Debug)]
#[command(name = "secop-warehouse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract, build and write the full warehouse
    Run {
        /// Output destination (local path or cloud URL)
        /// Supports: /path, s3://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path
        #[arg(short, long)]
        output: Option<String>,

        /// Records per page
        #[arg(long)]
        page_size: Option<u32>,

        /// API root override (e.g. a mirror or mock server)
        #[arg(long)]
        base_url: Option<String>,

        /// Dataset identifier
        #[arg(long)]
        dataset: Option<String>,

        /// SoQL `$where` expression applied to every extraction
        #[arg(long)]
        filter: Option<String>,

        /// Stop each extraction after this many records
        #[arg(long)]
        max_records: Option<u64>,
    },

    /// Print the dimension and fact catalog
    Tables,

    /// Show the commit history of a table
    History {
        /// Table path (e.g. gold/dim/entidades) or table name
        #[arg(short, long)]
        table: String,

        /// Output destination holding the table
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
