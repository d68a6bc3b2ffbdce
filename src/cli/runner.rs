//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::WarehouseConfig;
use crate::engine::{Pipeline, PipelineConfig};
use crate::error::Result;
use crate::output::DeltaSink;
use crate::source::SocrataSource;
use crate::warehouse::{dimension_spec, DIMENSIONS, FACT};
use serde_json::{json, Value};
use tracing::info;

/// Overrides given on the `run` command line
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub output: Option<String>,
    pub page_size: Option<u32>,
    pub base_url: Option<String>,
    pub dataset: Option<String>,
    pub filter: Option<String>,
    pub max_records: Option<u64>,
}

impl RunOverrides {
    /// Apply the overrides on top of file configuration
    pub fn apply(&self, config: &mut WarehouseConfig) {
        if let Some(output) = &self.output {
            config.output.destination.clone_from(output);
        }
        if let Some(page_size) = self.page_size {
            config.source.page_size = page_size;
        }
        if let Some(base_url) = &self.base_url {
            config.source.base_url = Some(base_url.clone());
        }
        if let Some(dataset) = &self.dataset {
            config.source.dataset.clone_from(dataset);
        }
        if let Some(filter) = &self.filter {
            config.source.filter = Some(filter.clone());
        }
        if let Some(max) = self.max_records {
            config.source.max_records = Some(max);
        }
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                output,
                page_size,
                base_url,
                dataset,
                filter,
                max_records,
            } => {
                let overrides = RunOverrides {
                    output: output.clone(),
                    page_size: *page_size,
                    base_url: base_url.clone(),
                    dataset: dataset.clone(),
                    filter: filter.clone(),
                    max_records: *max_records,
                };
                self.run_pipeline(&overrides).await
            }
            Commands::Tables => self.tables(),
            Commands::History { table, output } => self.history(table, output.as_deref()).await,
        }
    }

    /// Load configuration from `--config`, or defaults
    fn load_config(&self) -> Result<WarehouseConfig> {
        match &self.cli.config {
            Some(path) => WarehouseConfig::from_file(path),
            None => Ok(WarehouseConfig::default()),
        }
    }

    /// Run the full load
    async fn run_pipeline(&self, overrides: &RunOverrides) -> Result<()> {
        let mut config = self.load_config()?;
        overrides.apply(&mut config);
        config.validate()?;

        let source = SocrataSource::new(&config.source)?;
        let sink = DeltaSink::from_config(&config.output)?;
        info!(
            "Loading {} into {}",
            source.resource_url(),
            config.output.destination
        );

        let stats = Pipeline::new(&source, &sink)
            .with_config(PipelineConfig::from(&config.source))
            .run()
            .await?;

        self.output_message(&json!({
            "type": "RUN_COMPLETE",
            "destination": config.output.destination,
            "records_extracted": stats.records_extracted,
            "pages_fetched": stats.pages_fetched,
            "duration_ms": stats.duration_ms,
            "tables": stats.tables,
        }));
        Ok(())
    }

    /// Print the table catalog
    fn tables(&self) -> Result<()> {
        let dimensions: Vec<Value> = DIMENSIONS
            .iter()
            .map(|spec| {
                json!({
                    "name": spec.name,
                    "path": spec.path,
                    "key": spec.key_column,
                    "natural_key": spec.natural_key,
                    "group_by": spec.group_by,
                    "schema": spec.schema(),
                })
            })
            .collect();

        let joins: Vec<Value> = FACT
            .joins
            .iter()
            .map(|join| {
                json!({
                    "dimension": join.dimension,
                    "on": join.fact_columns,
                    "key": join.key_column,
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "CATALOG",
            "fact": {
                "name": FACT.name,
                "path": FACT.path,
                "joins": joins,
                "schema": FACT.schema(),
            },
            "dimensions": dimensions,
        }));
        Ok(())
    }

    /// Print the commit history of a table
    async fn history(&self, table: &str, output: Option<&str>) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(output) = output {
            config.output.destination = output.to_string();
        }

        let path = resolve_table_path(table);
        let sink = DeltaSink::from_config(&config.output)?;
        let history = sink.table(&path).history().await?;

        self.output_message(&json!({
            "type": "HISTORY",
            "table": path,
            "versions": history,
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Map a table name (`entidades`, `contratos`) to its path; paths pass through
pub fn resolve_table_path(table: &str) -> String {
    if table == FACT.name {
        return FACT.path.to_string();
    }
    dimension_spec(table).map_or_else(
        || table.trim_matches('/').to_string(),
        |spec| spec.path.to_string(),
    )
}
