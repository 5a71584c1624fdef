//! File management module for tagvault.
//!
//! This module provides object storage functionality including:
//! - Content digests for duplicate detection
//! - An object store client (S3, S3-compatible, local, in-memory)
//! - Upload/read/delete orchestration
//! - Bulk folder import and deletion

mod digest;
mod import;
mod service;
mod storage;

pub use digest::{digest_bytes, digest_file, digest_reader, ContentDigest, HASH_CHUNK_SIZE};
pub use import::{FolderDeleteReport, FolderImporter, ImportReport, ItemFailure};
pub use service::{FileManager, UploadOutcome};
pub use storage::{ObjectEntry, ObjectStoreClient};

/// Default maximum upload size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
