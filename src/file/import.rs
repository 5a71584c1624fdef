//! Folder import and deletion.
//!
//! A folder is walked once; every regular file is uploaded under its path
//! relative to the folder (optionally below a destination prefix) and then
//! auto-tagged by its local path. Uploads run on a bounded pool and every
//! per-file outcome ends up in the returned report.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::tag::TagIndex;
use crate::{Result, VaultError};

use super::service::{FileManager, UploadOutcome};

/// A file or object that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Local path or object key.
    pub path: String,
    /// Error message.
    pub error: String,
}

impl ItemFailure {
    fn new(path: impl Into<String>, error: impl ToString) -> Self {
        Self {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

/// Aggregated result of a folder import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Object names that were stored.
    pub uploaded: Vec<String>,
    /// Object names skipped as duplicates.
    pub skipped: Vec<String>,
    /// Files that failed.
    pub failed: Vec<ItemFailure>,
}

impl ImportReport {
    /// Number of files visited.
    pub fn total(&self) -> usize {
        self.uploaded.len() + self.skipped.len() + self.failed.len()
    }

    /// Whether every visited file succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn sort(&mut self) {
        self.uploaded.sort();
        self.skipped.sort();
        self.failed.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

/// Aggregated result of a folder deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderDeleteReport {
    /// Object keys deleted from the store.
    pub deleted: Vec<String>,
    /// Keys or directories that could not be removed.
    pub failed: Vec<ItemFailure>,
    /// Number of empty local subdirectories removed.
    pub removed_dirs: usize,
}

/// An upload running on the import pool, keyed by its task id.
#[derive(Debug)]
struct PendingUpload {
    file: PathBuf,
    object_name: String,
}

fn record_upload(
    report: &mut ImportReport,
    pending: &mut HashMap<task::Id, PendingUpload>,
    joined: std::result::Result<(task::Id, Result<UploadOutcome>), JoinError>,
) {
    let (id, outcome) = match joined {
        Ok((id, outcome)) => (id, Ok(outcome)),
        Err(e) => (e.id(), Err(e)),
    };
    let Some(upload) = pending.remove(&id) else {
        warn!(task = %id, "Import task finished without a pending entry");
        return;
    };

    match outcome {
        Ok(Ok(outcome)) if outcome.is_duplicate() => {
            report.skipped.push(outcome.object_name().to_string());
        }
        Ok(Ok(outcome)) => {
            report.uploaded.push(outcome.object_name().to_string());
        }
        Ok(Err(e)) => {
            warn!(
                path = %upload.file.display(),
                object_name = %upload.object_name,
                error = %e,
                "Failed to import file"
            );
            report.failed.push(ItemFailure::new(upload.file.display().to_string(), e));
        }
        Err(e) => {
            warn!(
                path = %upload.file.display(),
                object_name = %upload.object_name,
                error = %e,
                "Import task aborted"
            );
            report.failed.push(ItemFailure::new(upload.file.display().to_string(), e));
        }
    }
}

/// Imports local folders into the object store.
///
/// Holds shared handles to the file manager and tag index; their lifetime
/// is owned by the application state.
#[derive(Debug, Clone)]
pub struct FolderImporter {
    files: Arc<FileManager>,
    tags: Arc<TagIndex>,
    max_concurrent_uploads: usize,
}

impl FolderImporter {
    /// Create a new importer.
    pub fn new(files: Arc<FileManager>, tags: Arc<TagIndex>) -> Self {
        Self {
            files,
            tags,
            max_concurrent_uploads: 4,
        }
    }

    /// Set the maximum number of concurrent uploads (at least 1).
    pub fn with_max_concurrent_uploads(mut self, max: usize) -> Self {
        self.max_concurrent_uploads = max.max(1);
        self
    }

    /// Upload every regular file below `folder_path`.
    ///
    /// Object names are `dest_prefix` joined with the file's path relative
    /// to `folder_path`, using `/` as separator. A failing file is recorded
    /// and the import continues.
    ///
    /// # Errors
    /// `NotFound` if `folder_path` is not a directory.
    pub async fn import_folder(
        &self,
        folder_path: impl AsRef<Path>,
        dest_prefix: &str,
    ) -> Result<ImportReport> {
        let root = ensure_dir(folder_path.as_ref())?;
        let mut report = ImportReport::default();

        let (files, walk_errors) = collect_files(root.clone()).await?;
        report.failed.extend(walk_errors);

        info!(
            folder = %root.display(),
            files = files.len(),
            dest_prefix,
            "Importing folder"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_uploads));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();

        for file in files {
            let object_name = match relative_key(&root, &file) {
                Some(rel) => join_key(dest_prefix, &rel),
                None => {
                    report
                        .failed
                        .push(ItemFailure::new(file.display().to_string(), "path is not valid UTF-8"));
                    continue;
                }
            };

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| VaultError::LocalIo(std::io::Error::other("semaphore closed")))?;
            let files = Arc::clone(&self.files);
            let tags = Arc::clone(&self.tags);
            let task_file = file.clone();
            let task_object_name = object_name.clone();

            let handle = tasks.spawn(async move {
                let outcome = files
                    .upload_file(&task_file, Some(task_object_name.as_str()))
                    .await;
                tags.auto_tag(&task_file.to_string_lossy()).await;
                drop(permit);
                outcome
            });
            pending.insert(handle.id(), PendingUpload { file, object_name });
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            record_upload(&mut report, &mut pending, joined);
        }

        report.sort();
        info!(
            folder = %root.display(),
            uploaded = report.uploaded.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Folder import finished"
        );

        Ok(report)
    }

    /// Delete the remote objects of every file below `folder_path`.
    ///
    /// Keys are derived exactly as in [`FolderImporter::import_folder`]. The
    /// local files are left in place; afterwards every empty local
    /// subdirectory is removed, deepest first. The folder itself is kept.
    ///
    /// # Errors
    /// `NotFound` if `folder_path` is not a directory.
    pub async fn delete_folder(
        &self,
        folder_path: impl AsRef<Path>,
        dest_prefix: &str,
    ) -> Result<FolderDeleteReport> {
        let root = ensure_dir(folder_path.as_ref())?;
        let mut report = FolderDeleteReport::default();

        let (files, walk_errors) = collect_files(root.clone()).await?;
        report.failed.extend(walk_errors);

        for file in files {
            let Some(rel) = relative_key(&root, &file) else {
                report
                    .failed
                    .push(ItemFailure::new(file.display().to_string(), "path is not valid UTF-8"));
                continue;
            };
            let key = join_key(dest_prefix, &rel);

            match self.files.delete_file(&key).await {
                Ok(()) => report.deleted.push(key),
                Err(e) => report.failed.push(ItemFailure::new(key, e)),
            }
        }

        let (removed_dirs, dir_errors) = tokio::task::spawn_blocking(move || remove_empty_dirs(&root))
            .await
            .map_err(|e| VaultError::LocalIo(std::io::Error::other(e)))?;
        report.removed_dirs = removed_dirs;
        report.failed.extend(dir_errors);
        report.deleted.sort();

        info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            removed_dirs = report.removed_dirs,
            "Folder deletion finished"
        );

        Ok(report)
    }
}

fn ensure_dir(path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        Err(VaultError::NotFound(format!("folder '{}'", path.display())))
    }
}

/// Walk `root` on a blocking thread, returning regular files and walk errors.
async fn collect_files(root: PathBuf) -> Result<(Vec<PathBuf>, Vec<ItemFailure>)> {
    tokio::task::spawn_blocking(move || {
        let mut files = Vec::new();
        let mut errors = Vec::new();

        for entry in WalkDir::new(&root).follow_links(false) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    errors.push(ItemFailure::new(path, e));
                }
            }
        }

        (files, errors)
    })
    .await
    .map_err(|e| VaultError::LocalIo(std::io::Error::other(e)))
}

/// Remove empty subdirectories of `root`, deepest first.
fn remove_empty_dirs(root: &Path) -> (usize, Vec<ItemFailure>) {
    let mut removed = 0;
    let mut errors = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_dir() {
            continue;
        }

        let is_empty = std::fs::read_dir(entry.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if !is_empty {
            continue;
        }

        match std::fs::remove_dir(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => errors.push(ItemFailure::new(entry.path().display().to_string(), e)),
        }
    }

    (removed, errors)
}

/// Path of `file` relative to `root`, with `/` separators.
fn relative_key(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str()?);
        }
    }
    Some(parts.join("/"))
}

/// Join a destination prefix and a relative key.
fn join_key(prefix: &str, rel: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        rel.to_string()
    } else {
        format!("{prefix}/{rel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DedupMode;
    use crate::file::ObjectStoreClient;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<FileManager>, Arc<TagIndex>, FolderImporter) {
        let temp_dir = TempDir::new().unwrap();
        let files = Arc::new(FileManager::new(ObjectStoreClient::in_memory("test-bucket")));
        let tags = Arc::new(TagIndex::new());
        let importer = FolderImporter::new(Arc::clone(&files), Arc::clone(&tags));
        (temp_dir, files, tags, importer)
    }

    fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    async fn stored_keys(files: &FileManager) -> Vec<String> {
        let mut keys: Vec<_> = files
            .list_files()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key("", "a.txt"), "a.txt");
        assert_eq!(join_key("backup", "a.txt"), "backup/a.txt");
        assert_eq!(join_key("backup/", "sub/b.txt"), "backup/sub/b.txt");
    }

    #[test]
    fn test_relative_key() {
        let root = Path::new("/data/in");
        assert_eq!(
            relative_key(root, Path::new("/data/in/sub/b.txt")).as_deref(),
            Some("sub/b.txt")
        );
        assert_eq!(relative_key(root, Path::new("/other/x.txt")), None);
    }

    #[tokio::test]
    async fn test_import_folder_uploads_relative_keys_and_tags() {
        let (temp_dir, files, tags, importer) = setup();
        let a = write(temp_dir.path(), "a.txt", b"alpha");
        let b = write(temp_dir.path(), "sub/b.txt", b"beta");

        let report = importer.import_folder(temp_dir.path(), "").await.unwrap();

        assert_eq!(report.uploaded, vec!["a.txt", "sub/b.txt"]);
        assert!(report.skipped.is_empty());
        assert!(report.is_success());
        assert_eq!(stored_keys(&files).await, vec!["a.txt", "sub/b.txt"]);

        let a_tags = tags.get_tags(&a.to_string_lossy()).await;
        assert!(a_tags.contains("a"));
        assert!(a_tags.contains("txt"));
        let b_tags = tags.get_tags(&b.to_string_lossy()).await;
        assert!(b_tags.contains("sub"));
        assert!(b_tags.contains("b"));
    }

    #[tokio::test]
    async fn test_import_folder_with_prefix() {
        let (temp_dir, files, _tags, importer) = setup();
        write(temp_dir.path(), "a.txt", b"alpha");
        write(temp_dir.path(), "sub/b.txt", b"beta");

        let report = importer.import_folder(temp_dir.path(), "backup").await.unwrap();

        assert_eq!(report.total(), 2);
        assert_eq!(stored_keys(&files).await, vec!["backup/a.txt", "backup/sub/b.txt"]);
    }

    #[tokio::test]
    async fn test_import_empty_folder() {
        let (temp_dir, files, tags, importer) = setup();

        let report = importer.import_folder(temp_dir.path(), "").await.unwrap();

        assert_eq!(report.total(), 0);
        assert!(stored_keys(&files).await.is_empty());
        assert!(tags.is_empty().await);
    }

    #[tokio::test]
    async fn test_import_missing_folder() {
        let (temp_dir, _files, _tags, importer) = setup();

        let result = importer.import_folder(temp_dir.path().join("missing"), "").await;

        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_import_with_single_worker() {
        let (temp_dir, files, _tags, importer) = setup();
        let importer = importer.with_max_concurrent_uploads(1);
        for i in 0..10 {
            write(temp_dir.path(), &format!("dir{}/file{i}.txt", i % 3), format!("{i}").as_bytes());
        }

        let report = importer.import_folder(temp_dir.path(), "").await.unwrap();

        assert_eq!(report.uploaded.len(), 10);
        assert_eq!(stored_keys(&files).await.len(), 10);
    }

    #[tokio::test]
    async fn test_import_reports_duplicates_in_content_mode() {
        let temp_dir = TempDir::new().unwrap();
        let files = Arc::new(
            FileManager::new(ObjectStoreClient::in_memory("test-bucket"))
                .with_dedup_mode(DedupMode::Content),
        );
        let importer = FolderImporter::new(Arc::clone(&files), Arc::new(TagIndex::new()))
            .with_max_concurrent_uploads(1);
        files.store().put_bytes("existing.txt", b"dup".to_vec()).await.unwrap();
        write(temp_dir.path(), "copy.txt", b"dup");
        write(temp_dir.path(), "fresh.txt", b"new");

        let report = importer.import_folder(temp_dir.path(), "").await.unwrap();

        assert_eq!(report.skipped, vec!["copy.txt"]);
        assert_eq!(report.uploaded, vec!["fresh.txt"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_import_continues_after_unreadable_file() {
        use std::os::unix::fs::PermissionsExt;

        let (temp_dir, files, _tags, importer) = setup();
        write(temp_dir.path(), "good.txt", b"ok");
        let bad = write(temp_dir.path(), "bad.txt", b"secret");
        std::fs::set_permissions(&bad, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits; nothing to assert in that case.
        if std::fs::read(&bad).is_ok() {
            return;
        }

        let report = importer.import_folder(temp_dir.path(), "").await.unwrap();

        assert_eq!(report.uploaded, vec!["good.txt"]);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].path.ends_with("bad.txt"));
        assert_eq!(stored_keys(&files).await, vec!["good.txt"]);
    }

    #[tokio::test]
    async fn test_panicked_upload_is_reported_by_file() {
        let mut tasks: JoinSet<Result<UploadOutcome>> = JoinSet::new();
        let mut pending = HashMap::new();
        let mut report = ImportReport::default();

        let handle = tasks.spawn(async { panic!("upload task crashed") });
        pending.insert(
            handle.id(),
            PendingUpload {
                file: PathBuf::from("/data/in/broken.txt"),
                object_name: "in/broken.txt".to_string(),
            },
        );

        while let Some(joined) = tasks.join_next_with_id().await {
            record_upload(&mut report, &mut pending, joined);
        }

        assert!(pending.is_empty());
        assert!(report.uploaded.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, "/data/in/broken.txt");
        assert!(report.failed[0].error.contains("panic"));
    }

    #[tokio::test]
    async fn test_delete_folder_removes_keys_and_empty_dirs() {
        let (temp_dir, files, _tags, importer) = setup();
        write(temp_dir.path(), "a.txt", b"alpha");
        write(temp_dir.path(), "sub/b.txt", b"beta");
        std::fs::create_dir_all(temp_dir.path().join("empty/nested")).unwrap();
        importer.import_folder(temp_dir.path(), "").await.unwrap();
        files.store().put_bytes("unrelated.txt", b"keep".to_vec()).await.unwrap();

        let report = importer.delete_folder(temp_dir.path(), "").await.unwrap();

        let mut deleted = report.deleted.clone();
        deleted.sort();
        assert_eq!(deleted, vec!["a.txt", "sub/b.txt"]);
        assert!(report.failed.is_empty());
        assert_eq!(report.removed_dirs, 2);
        assert_eq!(stored_keys(&files).await, vec!["unrelated.txt"]);

        assert!(!temp_dir.path().join("empty").exists());
        assert!(temp_dir.path().join("sub/b.txt").exists());
        assert!(temp_dir.path().exists());
    }

    #[tokio::test]
    async fn test_delete_folder_missing() {
        let (temp_dir, _files, _tags, importer) = setup();

        let result = importer.delete_folder(temp_dir.path().join("missing"), "").await;

        assert!(matches!(result, Err(VaultError::NotFound(_))));
    }
}
