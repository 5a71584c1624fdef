//! tagvault - tagged file storage over S3-compatible object stores
//!
//! Uploads local files to an object store with content-hash duplicate
//! detection, imports whole folders, and keeps an in-memory tag index that
//! can be queried over HTTP.

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod tag;
pub mod web;

pub use config::{Config, DedupMode, StorageBackend};
pub use error::{Result, VaultError};
pub use file::{
    digest_bytes, digest_file, ContentDigest, FileManager, FolderDeleteReport, FolderImporter,
    ImportReport, ItemFailure, ObjectEntry, ObjectStoreClient, UploadOutcome,
};
pub use tag::{auto_tags, TagIndex, TagSet};
pub use web::{AppState, WebServer};
