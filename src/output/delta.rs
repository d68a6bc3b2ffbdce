//! Delta Lake transaction log
//!
//! A table is a directory of Parquet data files plus `_delta_log/`, a
//! sequence of newline-delimited JSON commits named by zero-padded version.
//! Replaying the commits in order yields the active file set and the latest
//! table metadata. Only overwrite commits are produced here.

use super::cloud::{CloudDestination, CreateOutcome};
use crate::error::{Error, Result};
use crate::schema::TableSchema;
use crate::types::Compression;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Log directory name inside a table
pub const LOG_DIR: &str = "_delta_log";

/// Engine identifier written into `commitInfo`
const ENGINE_INFO: &str = concat!("secop-warehouse/", env!("CARGO_PKG_VERSION"));

const MIN_READER_VERSION: i32 = 1;
const MIN_WRITER_VERSION: i32 = 2;

// ============================================================================
// Actions
// ============================================================================

/// Commit provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    /// Commit time, milliseconds since the epoch
    pub timestamp: i64,
    /// Operation name (e.g. `WRITE`)
    pub operation: String,
    /// Operation parameters (e.g. `mode`)
    #[serde(default)]
    pub operation_parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_blind_append: Option<bool>,
}

/// Reader/writer protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    /// Lowest reader protocol able to read the table
    pub min_reader_version: i32,
    /// Lowest writer protocol able to commit to the table
    pub min_writer_version: i32,
}

/// Data file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    /// File format name, always `parquet`
    pub provider: String,
    /// Format options
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            provider: "parquet".to_string(),
            options: BTreeMap::new(),
        }
    }
}

/// Table metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Unique table id
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub format: Format,
    /// JSON-encoded struct type
    pub schema_string: String,
    #[serde(default)]
    pub partition_columns: Vec<String>,
    #[serde(default)]
    pub configuration: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<i64>,
}

/// A data file added to the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Add {
    /// Path relative to the table root
    pub path: String,
    #[serde(default)]
    pub partition_values: BTreeMap<String, Option<String>>,
    pub size: i64,
    pub modification_time: i64,
    pub data_change: bool,
    /// JSON-encoded file statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<String>,
}

impl Add {
    /// `numRecords` from the file statistics, if present
    pub fn num_records(&self) -> Option<u64> {
        let stats: Value = serde_json::from_str(self.stats.as_deref()?).ok()?;
        stats.get("numRecords")?.as_u64()
    }
}

/// A data file logically removed from the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remove {
    /// Data file path relative to the table root
    pub path: String,
    /// Removal time in epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<i64>,
    /// Whether the removal changes table data
    pub data_change: bool,
    /// File size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// One line of a commit file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    CommitInfo(CommitInfo),
    Protocol(Protocol),
    MetaData(Metadata),
    Add(Add),
    Remove(Remove),
}

const KNOWN_ACTIONS: [&str; 5] = ["commitInfo", "protocol", "metaData", "add", "remove"];

/// Parse a commit file, skipping action kinds not modelled here
pub fn parse_commit(table: &str, content: &str) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| Error::delta_log(table, format!("malformed commit line: {e}")))?;
        let known = value
            .as_object()
            .and_then(|o| o.keys().next())
            .is_some_and(|k| KNOWN_ACTIONS.contains(&k.as_str()));
        if !known {
            debug!("Skipping unsupported action in {table}: {line}");
            continue;
        }
        let action = serde_json::from_value(value)
            .map_err(|e| Error::delta_log(table, format!("malformed action: {e}")))?;
        actions.push(action);
    }
    Ok(actions)
}

/// Render actions as a commit file
pub fn render_commit(actions: &[Action]) -> Result<String> {
    let mut out = String::new();
    for action in actions {
        out.push_str(&serde_json::to_string(action)?);
        out.push('\n');
    }
    Ok(out)
}

/// Commit file name for a version
pub fn commit_file_name(version: u64) -> String {
    format!("{version:020}.json")
}

fn parse_commit_file_name(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".json")?;
    if stem.len() == 20 && stem.bytes().all(|b| b.is_ascii_digit()) {
        stem.parse().ok()
    } else {
        None
    }
}

/// Data file name for a new Parquet file
pub fn data_file_name(compression: Compression) -> String {
    let id = uuid::Uuid::new_v4();
    match compression.file_infix() {
        Some(infix) => format!("part-00000-{id}-c000.{infix}.parquet"),
        None => format!("part-00000-{id}-c000.parquet"),
    }
}

// ============================================================================
// Snapshot and history
// ============================================================================

/// State of a table at its latest version
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Latest version, `None` if the table does not exist
    pub version: Option<u64>,
    pub protocol: Option<Protocol>,
    pub metadata: Option<Metadata>,
    /// Active data files keyed by path
    pub files: BTreeMap<String, Add>,
}

impl Snapshot {
    fn apply(&mut self, version: u64, actions: Vec<Action>) {
        self.version = Some(version);
        for action in actions {
            match action {
                Action::Protocol(p) => self.protocol = Some(p),
                Action::MetaData(m) => self.metadata = Some(m),
                Action::Add(add) => {
                    self.files.insert(add.path.clone(), add);
                }
                Action::Remove(remove) => {
                    self.files.remove(&remove.path);
                }
                Action::CommitInfo(_) => {}
            }
        }
    }

    /// Total `numRecords` over the active files
    pub fn num_records(&self) -> u64 {
        self.files.values().filter_map(Add::num_records).sum()
    }
}

/// One entry of a table's history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitSummary {
    pub version: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub operation: Option<String>,
    pub mode: Option<String>,
    pub files_added: usize,
    pub files_removed: usize,
    pub records_added: u64,
}

impl CommitSummary {
    fn from_actions(version: u64, actions: &[Action]) -> Self {
        let info = actions.iter().find_map(|a| match a {
            Action::CommitInfo(info) => Some(info),
            _ => None,
        });
        let adds: Vec<&Add> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Add(add) => Some(add),
                _ => None,
            })
            .collect();
        Self {
            version,
            timestamp: info.and_then(|i| DateTime::from_timestamp_millis(i.timestamp)),
            operation: info.map(|i| i.operation.clone()),
            mode: info
                .and_then(|i| i.operation_parameters.get("mode"))
                .and_then(Value::as_str)
                .map(ToString::to_string),
            files_added: adds.len(),
            files_removed: actions
                .iter()
                .filter(|a| matches!(a, Action::Remove(_)))
                .count(),
            records_added: adds.iter().filter_map(|a| a.num_records()).sum(),
        }
    }
}

/// Result of an overwrite commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub version: u64,
    /// Data file path relative to the table root
    pub data_file: String,
    pub files_removed: usize,
}

// ============================================================================
// Table
// ============================================================================

/// A Delta table at a path within a destination
#[derive(Debug, Clone)]
pub struct DeltaTable {
    destination: CloudDestination,
    path: String,
}

impl DeltaTable {
    /// Address the table at `path` (e.g. `gold/dim/entidades`)
    pub fn new(destination: CloudDestination, path: impl Into<String>) -> Self {
        Self {
            destination,
            path: path.into().trim_matches('/').to_string(),
        }
    }

    /// Table path
    pub fn path(&self) -> &str {
        &self.path
    }

    fn log_dir(&self) -> String {
        format!("{}/{LOG_DIR}", self.path)
    }

    fn commit_path(&self, version: u64) -> String {
        format!("{}/{}", self.log_dir(), commit_file_name(version))
    }

    /// Committed versions in ascending order
    pub async fn versions(&self) -> Result<Vec<u64>> {
        let mut versions: Vec<u64> = self
            .destination
            .list(&self.log_dir())
            .await?
            .iter()
            .filter_map(|(path, _)| path.rsplit('/').next())
            .filter_map(parse_commit_file_name)
            .collect();
        versions.sort_unstable();

        if let Some(first) = versions.first() {
            if *first != 0 {
                return Err(Error::delta_log(
                    &self.path,
                    format!("log starts at version {first}; checkpointed tables are not supported"),
                ));
            }
        }
        Ok(versions)
    }

    /// Read and parse one commit
    pub async fn read_commit(&self, version: u64) -> Result<Vec<Action>> {
        let bytes = self
            .destination
            .get(&self.commit_path(version))
            .await?
            .ok_or_else(|| Error::delta_log(&self.path, format!("missing commit {version}")))?;
        let content = std::str::from_utf8(&bytes)
            .map_err(|e| Error::delta_log(&self.path, format!("commit {version}: {e}")))?;
        parse_commit(&self.path, content)
    }

    /// Replay the log up to the latest version
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let mut snapshot = Snapshot::default();
        for version in self.versions().await? {
            let actions = self.read_commit(version).await?;
            snapshot.apply(version, actions);
        }
        Ok(snapshot)
    }

    /// Summaries of every commit, oldest first
    pub async fn history(&self) -> Result<Vec<CommitSummary>> {
        let mut history = Vec::new();
        for version in self.versions().await? {
            let actions = self.read_commit(version).await?;
            history.push(CommitSummary::from_actions(version, &actions));
        }
        Ok(history)
    }

    /// Replace the table content with one Parquet file
    ///
    /// Uploads `data`, then commits the next version removing every active
    /// file. A concurrent commit of the same version is an error.
    pub async fn overwrite(
        &self,
        schema: &TableSchema,
        data: Bytes,
        num_records: usize,
        compression: Compression,
    ) -> Result<CommitResult> {
        let snapshot = self.snapshot().await?;
        let version = snapshot.version.map_or(0, |v| v + 1);
        let now = Utc::now().timestamp_millis();

        let file_name = data_file_name(compression);
        let size = data.len() as i64;
        self.destination
            .put(&format!("{}/{file_name}", self.path), data)
            .await?;
        debug!("Uploaded {}/{file_name} ({size} bytes)", self.path);

        let mut actions = vec![Action::CommitInfo(CommitInfo {
            timestamp: now,
            operation: "WRITE".to_string(),
            operation_parameters: Map::from_iter([
                ("mode".to_string(), Value::from("Overwrite")),
                ("partitionBy".to_string(), Value::from("[]")),
            ]),
            engine_info: Some(ENGINE_INFO.to_string()),
            is_blind_append: Some(false),
        })];

        let schema_string = schema.to_delta_schema_string();
        match &snapshot.metadata {
            None => {
                actions.push(Action::Protocol(Protocol {
                    min_reader_version: MIN_READER_VERSION,
                    min_writer_version: MIN_WRITER_VERSION,
                }));
                actions.push(Action::MetaData(Metadata {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: None,
                    format: Format::default(),
                    schema_string,
                    partition_columns: Vec::new(),
                    configuration: BTreeMap::new(),
                    created_time: Some(now),
                }));
            }
            Some(current) if current.schema_string != schema_string => {
                info!("Schema of {} changed at version {version}", self.path);
                actions.push(Action::MetaData(Metadata {
                    schema_string,
                    ..current.clone()
                }));
            }
            Some(_) => {}
        }

        let files_removed = snapshot.files.len();
        actions.extend(snapshot.files.values().map(|add| {
            Action::Remove(Remove {
                path: add.path.clone(),
                deletion_timestamp: Some(now),
                data_change: true,
                size: Some(add.size),
            })
        }));

        let stats = HashMap::from([("numRecords", num_records)]);
        actions.push(Action::Add(Add {
            path: file_name.clone(),
            partition_values: BTreeMap::new(),
            size,
            modification_time: now,
            data_change: true,
            stats: Some(serde_json::to_string(&stats)?),
        }));

        let commit = Bytes::from(render_commit(&actions)?);
        match self
            .destination
            .put_create(&self.commit_path(version), commit)
            .await?
        {
            CreateOutcome::Created => Ok(CommitResult {
                version,
                data_file: file_name,
                files_removed,
            }),
            CreateOutcome::AlreadyExists => Err(Error::delta_log(
                &self.path,
                format!("version {version} was committed concurrently"),
            )),
        }
    }
}
