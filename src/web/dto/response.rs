//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::file::{FolderDeleteReport, ImportReport, ItemFailure, ObjectEntry, UploadOutcome};
use crate::tag::TagSet;

/// Plain acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Files
// ============================================================================

/// Upload result.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Human-readable message.
    pub message: String,
    /// Object key the file was stored under.
    pub object_name: String,
    /// Hex SHA-256 digest of the uploaded content.
    pub digest: String,
    /// `uploaded` or `already_exists`.
    pub status: String,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        let status = if outcome.is_duplicate() {
            "already_exists"
        } else {
            "uploaded"
        };
        Self {
            message: "File uploaded successfully".to_string(),
            object_name: outcome.object_name().to_string(),
            digest: outcome.digest().to_hex(),
            status: status.to_string(),
        }
    }
}

/// Text content of a stored object.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileContentResponse {
    /// Object content decoded as UTF-8.
    pub content: String,
}

/// A stored object.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileEntryResponse {
    /// Object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time (RFC 3339).
    pub last_modified: String,
}

impl From<ObjectEntry> for FileEntryResponse {
    fn from(entry: ObjectEntry) -> Self {
        Self {
            key: entry.key,
            size: entry.size,
            last_modified: entry.last_modified.to_rfc3339(),
        }
    }
}

/// Object listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileListResponse {
    /// Stored objects sorted by key.
    pub files: Vec<FileEntryResponse>,
}

// ============================================================================
// Tags
// ============================================================================

/// Tags of a single file.
#[derive(Debug, Serialize, ToSchema)]
pub struct TagsResponse {
    /// Tags in sorted order.
    pub tags: Vec<String>,
}

impl From<TagSet> for TagsResponse {
    fn from(tags: TagSet) -> Self {
        Self {
            tags: tags.into_iter().collect(),
        }
    }
}

/// Tag search result.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// Matching file paths, sorted.
    pub files: Vec<String>,
}

// ============================================================================
// Folders
// ============================================================================

/// A file that could not be processed.
#[derive(Debug, Serialize, ToSchema)]
pub struct FailureResponse {
    /// Local path or object key.
    pub path: String,
    /// Error description.
    pub error: String,
}

impl From<ItemFailure> for FailureResponse {
    fn from(failure: ItemFailure) -> Self {
        Self {
            path: failure.path,
            error: failure.error,
        }
    }
}

/// Folder import result.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    /// Human-readable message.
    pub message: String,
    /// Object keys that were written.
    pub uploaded: Vec<String>,
    /// Object keys skipped as duplicates.
    pub skipped: Vec<String>,
    /// Files that failed to import.
    pub failed: Vec<FailureResponse>,
}

impl From<ImportReport> for ImportResponse {
    fn from(report: ImportReport) -> Self {
        let message = if report.is_success() {
            "Folder imported successfully".to_string()
        } else {
            format!("Folder imported with {} failed file(s)", report.failed.len())
        };
        Self {
            message,
            uploaded: report.uploaded,
            skipped: report.skipped,
            failed: report.failed.into_iter().map(Into::into).collect(),
        }
    }
}

/// Folder delete result.
#[derive(Debug, Serialize, ToSchema)]
pub struct FolderDeleteResponse {
    /// Human-readable message.
    pub message: String,
    /// Object keys that were deleted.
    pub deleted: Vec<String>,
    /// Objects that could not be deleted.
    pub failed: Vec<FailureResponse>,
    /// Number of empty local directories removed.
    pub removed_dirs: usize,
}

impl From<FolderDeleteReport> for FolderDeleteResponse {
    fn from(report: FolderDeleteReport) -> Self {
        let message = if report.failed.is_empty() {
            "Folder deleted successfully".to_string()
        } else {
            format!("Folder deleted with {} failed file(s)", report.failed.len())
        };
        Self {
            message,
            deleted: report.deleted,
            failed: report.failed.into_iter().map(Into::into).collect(),
            removed_dirs: report.removed_dirs,
        }
    }
}
