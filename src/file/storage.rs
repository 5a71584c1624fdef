//! Object store client for tagvault.
//!
//! This module wraps an [`object_store::ObjectStore`] behind the small set of
//! operations the file manager needs:
//! - Put (from a local file or from memory), overwriting existing keys
//! - Get, failing with `NotFound` for missing keys
//! - Delete, tolerating missing keys
//! - List, as one lazy stream over every page of the bucket

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore, PutPayload};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{StorageBackend, StorageConfig};
use crate::{Result, VaultError};

/// A listed object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectEntry {
    /// Object key, as it was given to [`ObjectStoreClient::put`].
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time reported by the store.
    pub last_modified: DateTime<Utc>,
    #[serde(skip)]
    location: ObjectPath,
}

impl ObjectEntry {
    /// Location of the object inside the store.
    pub fn location(&self) -> &ObjectPath {
        &self.location
    }
}

impl From<ObjectMeta> for ObjectEntry {
    fn from(meta: ObjectMeta) -> Self {
        Self {
            key: object_key(&meta.location),
            size: meta.size as u64,
            last_modified: meta.last_modified,
            location: meta.location,
        }
    }
}

/// Store location for a key.
///
/// Characters the store reserves (`[`, `%`, `#` and the like) are
/// percent-encoded inside each `/`-separated segment.
fn object_path(key: &str) -> ObjectPath {
    ObjectPath::from(key)
}

/// Key for a store location; the inverse of [`object_path`].
fn object_key(location: &ObjectPath) -> String {
    location
        .parts()
        .map(|part| match urlencoding::decode(part.as_ref()) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => part.as_ref().to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Client for a single bucket.
///
/// Bucket, region and endpoint are fixed at construction time.
#[derive(Debug, Clone)]
pub struct ObjectStoreClient {
    store: Arc<dyn ObjectStore>,
    bucket_name: String,
}

impl ObjectStoreClient {
    /// Wrap an existing store.
    pub fn new(store: Arc<dyn ObjectStore>, bucket_name: impl Into<String>) -> Self {
        Self {
            store,
            bucket_name: bucket_name.into(),
        }
    }

    /// Create a client backed by process memory.
    pub fn in_memory(bucket_name: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemory::new()), bucket_name)
    }

    /// Build a client from configuration.
    ///
    /// For the S3 backend, credentials are read from the standard AWS
    /// environment variables. When `use_s3_compatible` is set, the custom
    /// endpoint is used with path-style addressing and plain HTTP allowed.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let store: Arc<dyn ObjectStore> = match config.backend {
            StorageBackend::S3 => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(&config.bucket_name)
                    .with_region(&config.region);

                if config.use_s3_compatible {
                    let endpoint = config.endpoint_url.as_deref().ok_or_else(|| {
                        VaultError::Config("S3-compatible endpoint_url is not set".to_string())
                    })?;
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_virtual_hosted_style_request(false)
                        .with_allow_http(true);
                }

                Arc::new(builder.build().map_err(|e| {
                    VaultError::Config(format!("failed to build S3 client: {e}"))
                })?)
            }
            StorageBackend::Local => {
                std::fs::create_dir_all(&config.local_root)?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(&config.local_root).map_err(|e| {
                        VaultError::Config(format!("invalid local storage root: {e}"))
                    })?,
                )
            }
            StorageBackend::Memory => Arc::new(InMemory::new()),
        };

        info!(
            backend = ?config.backend,
            bucket = %config.bucket_name,
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("-"),
            "Object store client initialized"
        );

        Ok(Self::new(store, &config.bucket_name))
    }

    /// Get the bucket name.
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Upload the content of a local file under `key`, overwriting any existing object.
    pub async fn put(&self, key: &str, source_path: impl AsRef<Path>) -> Result<()> {
        let content = tokio::fs::read(source_path.as_ref()).await?;
        self.put_bytes(key, content).await
    }

    /// Upload in-memory content under `key`, overwriting any existing object.
    pub async fn put_bytes(&self, key: &str, content: impl Into<Bytes>) -> Result<()> {
        let content: Bytes = content.into();
        let size = content.len();
        self.store
            .put(&object_path(key), PutPayload::from(content))
            .await?;
        debug!(bucket = %self.bucket_name, key, size, "Object stored");
        Ok(())
    }

    /// Fetch the content of `key`.
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        self.fetch(&object_path(key)).await
    }

    /// Fetch the content of a listed object.
    pub async fn get_entry(&self, entry: &ObjectEntry) -> Result<Bytes> {
        self.fetch(entry.location()).await
    }

    async fn fetch(&self, location: &ObjectPath) -> Result<Bytes> {
        let result = self.store.get(location).await?;
        Ok(result.bytes().await?)
    }

    /// Delete `key`. Deleting a missing key is not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        match self.store.delete(&object_path(key)).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => {
                debug!(key, "Delete of missing object ignored");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether `key` exists.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        match self.store.head(&object_path(key)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Stream every object in the bucket.
    ///
    /// Paging through the backend happens lazily inside the stream.
    pub fn list(&self) -> BoxStream<'_, Result<ObjectEntry>> {
        self.store
            .list(None)
            .map_ok(ObjectEntry::from)
            .map_err(VaultError::from)
            .boxed()
    }

    /// Collect every object in the bucket, sorted by key.
    pub async fn list_all(&self) -> Result<Vec<ObjectEntry>> {
        let mut entries: Vec<ObjectEntry> = self.list().try_collect().await?;
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
