//! Configuration types for a warehouse run
//!
//! Configuration can be loaded from a YAML or JSON file. Every field has a
//! default, so an empty file (or no file at all) reproduces the standard
//! SECOP II load into the current directory.

use crate::error::{Error, Result, ResultExt};
use crate::types::Compression;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Socrata domain hosting the SECOP datasets
pub const DEFAULT_DOMAIN: &str = "www.datos.gov.co";

/// SECOP II contracts dataset identifier
pub const DEFAULT_DATASET: &str = "jbjy-vk9h";

/// Records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 50_000;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration for a warehouse run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Source dataset configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// Output destination configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl WarehouseConfig {
    /// Load configuration from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a YAML (or JSON) string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.output.validate()
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Configuration of the remote Socrata dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Socrata domain (e.g. "www.datos.gov.co")
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Dataset identifier (e.g. "jbjy-vk9h")
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Override for the API root, e.g. a mirror or a local mock server
    #[serde(default)]
    pub base_url: Option<String>,

    /// Records per page (`$limit`)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// SoQL `$where` expression applied to every extraction
    #[serde(default)]
    pub filter: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Stop each extraction after this many records (sampling runs)
    #[serde(default)]
    pub max_records: Option<u64>,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            dataset: default_dataset(),
            base_url: None,
            page_size: default_page_size(),
            filter: None,
            timeout_secs: default_timeout_secs(),
            max_records: None,
        }
    }
}

impl SourceConfig {
    /// API root: the configured base URL or `https://{domain}`
    pub fn api_root(&self) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.domain),
        }
    }

    /// Full resource URL for the dataset's JSON endpoint
    pub fn resource_url(&self) -> String {
        format!("{}/resource/{}.json", self.api_root(), self.dataset)
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value(
                "source.page_size",
                "must be greater than zero",
            ));
        }
        if self.max_records == Some(0) {
            return Err(Error::invalid_value(
                "source.max_records",
                "must be greater than zero",
            ));
        }
        if self.dataset.trim().is_empty() {
            return Err(Error::invalid_value("source.dataset", "must not be empty"));
        }
        if self.base_url.is_none() && self.domain.trim().is_empty() {
            return Err(Error::invalid_value(
                "source.domain",
                "must not be empty when no base_url is set",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Output Config
// ============================================================================

/// Configuration of the table store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Local directory or cloud URL (s3://, r2://, gs://, az://) holding `gold/`
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Parquet compression codec for data files
    #[serde(default)]
    pub compression: Compression,
}

fn default_destination() -> String {
    ".".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            compression: Compression::default(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<()> {
        if self.destination.trim().is_empty() {
            return Err(Error::invalid_value(
                "output.destination",
                "must not be empty",
            ));
        }
        Ok(())
    }
}
