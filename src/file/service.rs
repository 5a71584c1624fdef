//! File manager for tagvault.
//!
//! This module provides the high-level file operations:
//! - Upload with a duplicate check by content digest
//! - Read, list and delete of stored objects

use std::path::Path;

use bytes::Bytes;
use futures::TryStreamExt;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::DedupMode;
use crate::{Result, VaultError};

use super::digest::{digest_bytes, digest_file, ContentDigest};
use super::storage::{ObjectEntry, ObjectStoreClient};

/// Outcome of an upload that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// The file was stored under `object_name`.
    Uploaded {
        object_name: String,
        digest: ContentDigest,
    },
    /// An object with the same content already exists; nothing was stored.
    AlreadyExists {
        object_name: String,
        digest: ContentDigest,
    },
}

impl UploadOutcome {
    /// Target object name.
    pub fn object_name(&self) -> &str {
        match self {
            UploadOutcome::Uploaded { object_name, .. }
            | UploadOutcome::AlreadyExists { object_name, .. } => object_name,
        }
    }

    /// Digest of the uploaded content.
    pub fn digest(&self) -> &ContentDigest {
        match self {
            UploadOutcome::Uploaded { digest, .. } | UploadOutcome::AlreadyExists { digest, .. } => {
                digest
            }
        }
    }

    /// Whether the upload was skipped as a duplicate.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, UploadOutcome::AlreadyExists { .. })
    }
}

/// File manager orchestrating hashing, duplicate checks and the object store.
#[derive(Debug, Clone)]
pub struct FileManager {
    store: ObjectStoreClient,
    dedup: DedupMode,
}

impl FileManager {
    /// Create a new FileManager using the legacy duplicate check.
    pub fn new(store: ObjectStoreClient) -> Self {
        Self {
            store,
            dedup: DedupMode::default(),
        }
    }

    /// Select the duplicate detection strategy.
    pub fn with_dedup_mode(mut self, dedup: DedupMode) -> Self {
        self.dedup = dedup;
        self
    }

    /// Get the underlying store client.
    pub fn store(&self) -> &ObjectStoreClient {
        &self.store
    }

    /// Get the configured duplicate detection strategy.
    pub fn dedup_mode(&self) -> DedupMode {
        self.dedup
    }

    /// Upload a local file.
    ///
    /// `object_name` defaults to the basename of `local_path`. If an object
    /// with the same content digest is already stored, the upload is skipped
    /// and [`UploadOutcome::AlreadyExists`] is returned.
    ///
    /// # Errors
    /// - `LocalIo` if `local_path` cannot be read
    /// - `Storage` if listing or storing fails
    pub async fn upload_file(
        &self,
        local_path: impl AsRef<Path>,
        object_name: Option<&str>,
    ) -> Result<UploadOutcome> {
        let local_path = local_path.as_ref();
        let object_name = match object_name {
            Some(name) => name.to_string(),
            None => basename(local_path)?,
        };

        let digest = digest_file(local_path).await?;

        if self.check_file_exists(&digest).await? {
            info!(
                path = %local_path.display(),
                object_name = %object_name,
                "File already exists in the bucket, upload skipped"
            );
            return Ok(UploadOutcome::AlreadyExists {
                object_name,
                digest,
            });
        }

        self.store.put(&object_name, local_path).await.map_err(|e| {
            error!(
                path = %local_path.display(),
                object_name = %object_name,
                error = %e,
                "Upload failed"
            );
            e
        })?;

        info!(
            path = %local_path.display(),
            bucket = %self.store.bucket_name(),
            object_name = %object_name,
            "File uploaded"
        );

        Ok(UploadOutcome::Uploaded {
            object_name,
            digest,
        })
    }

    /// Check whether any stored object has the given content digest.
    ///
    /// Every object in the bucket is visited and its digest recomputed
    /// according to the configured [`DedupMode`].
    pub async fn check_file_exists(&self, digest: &ContentDigest) -> Result<bool> {
        let mut objects = self.store.list();

        while let Some(entry) = objects.try_next().await? {
            let stored = match self.dedup {
                DedupMode::Legacy => self.legacy_digest(&entry.key).await,
                DedupMode::Content => Some(digest_bytes(&self.store.get_entry(&entry).await?)),
            };

            if stored.as_ref() == Some(digest) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Known defect: hashes the object's remote URL as if it were a local file.
    ///
    /// Remote bytes are never fetched and the URL never names a readable
    /// file, so this yields `None` for every real object.
    async fn legacy_digest(&self, key: &str) -> Option<ContentDigest> {
        let pseudo_path = format!("s3://{}/{}", self.store.bucket_name(), key);
        match digest_file(&pseudo_path).await {
            Ok(digest) => Some(digest),
            Err(e) => {
                debug!(path = %pseudo_path, error = %e, "Could not hash stored object");
                None
            }
        }
    }

    /// Delete a stored object.
    ///
    /// A missing object is not an error. Other failures are logged and
    /// returned to the caller.
    pub async fn delete_file(&self, object_name: &str) -> Result<()> {
        match self.store.delete(object_name).await {
            Ok(()) => {
                info!(
                    bucket = %self.store.bucket_name(),
                    object_name,
                    "File deleted"
                );
                Ok(())
            }
            Err(e) => {
                error!(object_name, error = %e, "Error deleting file");
                Err(e)
            }
        }
    }

    /// Read the raw content of a stored object.
    pub async fn read_file(&self, object_name: &str) -> Result<Bytes> {
        self.store.get(object_name).await
    }

    /// Read a stored object and decode it as UTF-8 text.
    pub async fn read_text(&self, object_name: &str) -> Result<String> {
        let content = self.read_file(object_name).await?;
        String::from_utf8(content.to_vec()).map_err(|_| {
            VaultError::Validation(format!("object '{object_name}' is not valid UTF-8 text"))
        })
    }

    /// List every stored object.
    pub async fn list_files(&self) -> Result<Vec<ObjectEntry>> {
        self.store.list_all().await
    }
}

/// Final path component as an owned string.
fn basename(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            VaultError::Validation(format!("'{}' has no file name", path.display()))
        })
}
