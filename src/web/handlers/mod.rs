//! API handlers for the tagvault web service.

pub mod file;
pub mod folder;
pub mod tag;

pub use file::*;
pub use folder::*;
pub use tag::*;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::file::{FileManager, FolderImporter, ObjectStoreClient, DEFAULT_MAX_FILE_SIZE};
use crate::tag::TagIndex;
use crate::Result;

/// Shared state for every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upload/read/delete orchestration.
    pub files: Arc<FileManager>,
    /// In-memory tag index.
    pub tags: Arc<TagIndex>,
    /// Bulk folder import and deletion.
    pub importer: FolderImporter,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
    /// Directory for spooling uploads before they are sent to the store.
    pub tmp_dir: PathBuf,
}

impl AppState {
    /// Create a new application state with an empty tag index.
    pub fn new(files: FileManager) -> Self {
        let files = Arc::new(files);
        let tags = Arc::new(TagIndex::new());
        let importer = FolderImporter::new(Arc::clone(&files), Arc::clone(&tags));
        Self {
            files,
            tags,
            importer,
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
            tmp_dir: std::env::temp_dir(),
        }
    }

    /// Build the state described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = ObjectStoreClient::from_config(&config.storage)?;
        let files = FileManager::new(store).with_dedup_mode(config.files.dedup);

        Ok(Self::new(files)
            .with_max_upload_size_mb(config.files.max_upload_size_mb)
            .with_tmp_dir(&config.files.tmp_dir)
            .with_max_concurrent_uploads(config.import.max_concurrent_uploads))
    }

    /// Set the maximum upload size in megabytes.
    pub fn with_max_upload_size_mb(mut self, max_mb: u64) -> Self {
        self.max_upload_size = max_mb * 1024 * 1024;
        self
    }

    /// Set the upload spool directory.
    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self
    }

    /// Set the folder import concurrency.
    pub fn with_max_concurrent_uploads(mut self, max: usize) -> Self {
        self.importer = self.importer.with_max_concurrent_uploads(max);
        self
    }
}
