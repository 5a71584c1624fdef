//! Folder handlers for Web API.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::web::dto::{FolderDeleteResponse, FolderRequest, ImportResponse, ValidatedForm};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /folders/import - Import a local folder into the object store.
///
/// Every regular file below `folder_path` is uploaded under
/// `dest_prefix/<relative path>` and auto-tagged by its local path. Files that
/// fail are listed in the response; the rest of the import still runs.
///
/// The import runs on its own task and is not cut short by the request
/// timeout or a dropped connection.
#[utoipa::path(
    post,
    path = "/folders/import",
    tag = "folders",
    request_body(content = FolderRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Import finished", body = ImportResponse),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn import_folder(
    State(state): State<Arc<AppState>>,
    ValidatedForm(req): ValidatedForm<FolderRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    let importer = state.importer.clone();
    let report = tokio::spawn(async move {
        importer
            .import_folder(&req.folder_path, &req.dest_prefix)
            .await
    })
    .await
    .map_err(|e| {
        tracing::error!("Folder import task failed: {}", e);
        ApiError::internal("Folder import failed")
    })??;
    Ok(Json(report.into()))
}

/// POST /folders/delete - Delete the remote objects of a local folder.
///
/// Local files are kept; empty local subdirectories are removed.
#[utoipa::path(
    post,
    path = "/folders/delete",
    tag = "folders",
    request_body(content = FolderRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Deletion finished", body = FolderDeleteResponse),
        (status = 404, description = "Folder not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    ValidatedForm(req): ValidatedForm<FolderRequest>,
) -> Result<Json<FolderDeleteResponse>, ApiError> {
    let importer = state.importer.clone();
    let report = tokio::spawn(async move {
        importer
            .delete_folder(&req.folder_path, &req.dest_prefix)
            .await
    })
    .await
    .map_err(|e| {
        tracing::error!("Folder delete task failed: {}", e);
        ApiError::internal("Folder delete failed")
    })??;
    Ok(Json(report.into()))
}
