//! Storage destinations (local, S3, R2, GCS, Azure)

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
#[cfg(test)]
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore, PutMode, PutOptions, PutPayload};
use std::sync::Arc;
use tracing::warn;

/// Outcome of a create-only write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The object did not exist and was written
    Created,
    /// An object already exists at the path
    AlreadyExists,
}

/// Storage destination parsed from a URL
#[derive(Debug, Clone)]
pub struct CloudDestination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// Original URL scheme for logging
    scheme: String,
}

impl CloudDestination {
    /// Parse a destination URL and create appropriate object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/` or `./path/` - Local filesystem
    pub fn parse(url: &str) -> Result<Self> {
        if url.starts_with("s3://") {
            Self::parse_s3(url, false)
        } else if url.starts_with("r2://") {
            Self::parse_s3(url, true)
        } else if url.starts_with("gs://") {
            Self::parse_gcs(url)
        } else if url.starts_with("az://") {
            Self::parse_azure(url)
        } else {
            Self::parse_local(url)
        }
    }

    /// In-memory destination
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            prefix: String::new(),
            scheme: "memory".to_string(),
        }
    }

    fn split_bucket<'a>(url: &'a str, scheme: &str) -> Result<(&'a str, String)> {
        let without_scheme = url
            .strip_prefix(&format!("{scheme}://"))
            .ok_or_else(|| Error::config(format!("Invalid {scheme} URL: {url}")))?;

        let (bucket, prefix) = match without_scheme.find('/') {
            Some(idx) => (
                &without_scheme[..idx],
                without_scheme[idx + 1..].trim_end_matches('/').to_string(),
            ),
            None => (without_scheme, String::new()),
        };
        if bucket.is_empty() {
            return Err(Error::config(format!("Missing bucket in URL: {url}")));
        }
        Ok((bucket, prefix))
    }

    /// Parse S3 or R2 URL
    fn parse_s3(url: &str, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let (bucket, prefix) = Self::split_bucket(url, scheme)?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // AWS_ENDPOINT is read by from_env(); R2 may also use R2_ENDPOINT_URL
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
        })
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str) -> Result<Self> {
        let (bucket, prefix) = Self::split_bucket(url, "gs")?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
        })
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str) -> Result<Self> {
        let (container, prefix) = Self::split_bucket(url, "az")?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
        })
    }

    /// Object path of `relative` under the destination prefix
    pub fn object_path(&self, relative: &str) -> ObjectPath {
        let relative = relative.trim_start_matches('/');
        if self.prefix.is_empty() {
            ObjectPath::from(relative)
        } else {
            ObjectPath::from(format!("{}/{relative}", self.prefix))
        }
    }

    /// URL-like rendering of a path for logging
    pub fn display_path(&self, relative: &str) -> String {
        format!("{}://{}", self.scheme, self.object_path(relative))
    }

    /// Write bytes, replacing any existing object
    pub async fn put(&self, relative: &str, data: Bytes) -> Result<()> {
        let path = self.object_path(relative);
        self.store.put(&path, PutPayload::from(data)).await?;
        Ok(())
    }

    /// Write bytes only if nothing exists at the path
    ///
    /// Stores without conditional writes fall back to a plain put.
    pub async fn put_create(&self, relative: &str, data: Bytes) -> Result<CreateOutcome> {
        let path = self.object_path(relative);
        let opts = PutOptions {
            mode: PutMode::Create,
            ..PutOptions::default()
        };

        match self
            .store
            .put_opts(&path, PutPayload::from(data.clone()), opts)
            .await
        {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(object_store::Error::AlreadyExists { .. }) => Ok(CreateOutcome::AlreadyExists),
            Err(object_store::Error::NotImplemented) => {
                warn!(
                    "{} does not support conditional writes, writing {path} unconditionally",
                    self.scheme
                );
                self.store.put(&path, PutPayload::from(data)).await?;
                Ok(CreateOutcome::Created)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read an object; `None` when it does not exist
    pub async fn get(&self, relative: &str) -> Result<Option<Bytes>> {
        let path = self.object_path(relative);
        match self.store.get(&path).await {
            Ok(result) => Ok(Some(result.bytes().await?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List objects under a directory, with paths relative to the destination
    pub async fn list(&self, relative_dir: &str) -> Result<Vec<(String, ObjectMeta)>> {
        let dir = self.object_path(relative_dir);
        let objects: Vec<ObjectMeta> = self.store.list(Some(&dir)).try_collect().await?;

        let strip = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.prefix)
        };
        Ok(objects
            .into_iter()
            .map(|meta| {
                let location = meta.location.to_string();
                let relative = location
                    .strip_prefix(&strip)
                    .unwrap_or(&location)
                    .to_string();
                (relative, meta)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().to_str().unwrap();
        let dest = CloudDestination::parse(path).unwrap();
        assert_eq!(dest.display_path("gold/dim/tiempo"), "file://gold/dim/tiempo");
    }

    #[test]
    fn test_parse_missing_bucket() {
        assert!(CloudDestination::parse("gs:///data").is_err());
    }

    #[test]
    fn test_object_path_with_prefix() {
        let dest = CloudDestination {
            store: Arc::new(InMemory::new()),
            prefix: "warehouse/secop".to_string(),
            scheme: "s3".to_string(),
        };
        assert_eq!(
            dest.object_path("gold/dim/tiempo/_delta_log").to_string(),
            "warehouse/secop/gold/dim/tiempo/_delta_log"
        );
        assert_eq!(
            dest.display_path("gold/facts/contratos"),
            "s3://warehouse/secop/gold/facts/contratos"
        );
    }

    #[tokio::test]
    async fn test_put_create_detects_existing() {
        let dest = CloudDestination::in_memory();
        let first = dest
            .put_create("t/_delta_log/0.json", Bytes::from("a"))
            .await
            .unwrap();
        let second = dest
            .put_create("t/_delta_log/0.json", Bytes::from("b"))
            .await
            .unwrap();
        assert_eq!(first, CreateOutcome::Created);
        assert_eq!(second, CreateOutcome::AlreadyExists);
        assert_eq!(
            dest.get("t/_delta_log/0.json").await.unwrap(),
            Some(Bytes::from("a"))
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let dest = CloudDestination::in_memory();
        assert_eq!(dest.get("nothing/here").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_relative_paths() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dest = CloudDestination::parse(temp_dir.path().to_str().unwrap()).unwrap();
        dest.put("a/b/one.json", Bytes::from("1")).await.unwrap();
        dest.put("a/c/two.json", Bytes::from("2")).await.unwrap();

        let mut listed: Vec<String> = dest
            .list("a/b")
            .await
            .unwrap()
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        listed.sort();
        assert_eq!(listed, vec!["a/b/one.json".to_string()]);
    }
}
