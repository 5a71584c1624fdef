//! File handlers for Web API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;

use crate::web::dto::{
    sanitize_file_name, FileContentResponse, FileEntryResponse, FileListResponse,
    MessageResponse, UploadForm, UploadResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" field and an optional
/// "object_name" field. Without "object_name" the object is stored under the
/// uploaded file's base name.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "No file or invalid multipart data"),
        (status = 413, description = "File too large"),
        (status = 500, description = "Object store failure")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut filename: Option<String> = None;
    let mut object_name: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            tracing::error!("Failed to read file content: {}", e);
                            ApiError::bad_request("Failed to read file")
                        })?
                        .to_vec(),
                );
            }
            "object_name" => {
                object_name = Some(field.text().await.map_err(|e| {
                    tracing::error!("Failed to read object_name: {}", e);
                    ApiError::bad_request("Invalid object_name")
                })?);
            }
            _ => {}
        }
    }

    let content = content.ok_or_else(|| ApiError::bad_request("No file part"))?;
    let filename = filename.unwrap_or_default();

    if content.len() as u64 > state.max_upload_size {
        let max_mb = state.max_upload_size / 1024 / 1024;
        return Err(ApiError::payload_too_large(format!(
            "File too large (max {}MB)",
            max_mb
        )));
    }

    let object_name = match object_name.map(|n| n.trim().to_string()) {
        Some(name) if !name.is_empty() => {
            if name.chars().any(|c| c.is_control()) {
                return Err(ApiError::bad_request("Invalid object_name"));
            }
            name
        }
        _ => sanitize_file_name(&filename)
            .ok_or_else(|| ApiError::bad_request("No selected file"))?,
    };

    tokio::fs::create_dir_all(&state.tmp_dir).await.map_err(|e| {
        tracing::error!("Failed to create upload directory: {}", e);
        ApiError::internal("Failed to save file")
    })?;
    let spool_path = state
        .tmp_dir
        .join(format!("tagvault-upload-{}", uuid::Uuid::new_v4()));
    tokio::fs::write(&spool_path, &content).await.map_err(|e| {
        tracing::error!("Failed to write upload to {}: {}", spool_path.display(), e);
        ApiError::internal("Failed to save file")
    })?;

    let result = state
        .files
        .upload_file(&spool_path, Some(object_name.as_str()))
        .await;

    if let Err(e) = tokio::fs::remove_file(&spool_path).await {
        tracing::warn!(path = %spool_path.display(), error = %e, "Failed to remove upload spool file");
    }

    let outcome = result?;
    tracing::info!(
        object_name = outcome.object_name(),
        size = content.len(),
        duplicate = outcome.is_duplicate(),
        "File uploaded"
    );

    Ok(Json(outcome.into()))
}

/// GET /files/{object_name} - Read a stored object as text.
#[utoipa::path(
    get,
    path = "/files/{object_name}",
    tag = "files",
    params(
        ("object_name" = String, Path, description = "Object key (may contain '/')")
    ),
    responses(
        (status = 200, description = "Object content", body = FileContentResponse),
        (status = 404, description = "Object not found"),
        (status = 422, description = "Object is not UTF-8 text")
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(object_name): Path<String>,
) -> Result<Json<FileContentResponse>, ApiError> {
    let content = state.files.read_text(&object_name).await?;
    Ok(Json(FileContentResponse { content }))
}

/// DELETE /files/{object_name} - Delete a stored object.
///
/// Deleting a missing object succeeds.
#[utoipa::path(
    delete,
    path = "/files/{object_name}",
    tag = "files",
    params(
        ("object_name" = String, Path, description = "Object key (may contain '/')")
    ),
    responses(
        (status = 200, description = "Object deleted", body = MessageResponse),
        (status = 500, description = "Object store failure")
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(object_name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.files.delete_file(&object_name).await?;
    Ok(Json(MessageResponse::new("File deleted successfully")))
}

/// GET /files - List stored objects.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Stored objects", body = FileListResponse),
        (status = 500, description = "Object store failure")
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileListResponse>, ApiError> {
    let entries = state.files.list_files().await?;
    Ok(Json(FileListResponse {
        files: entries.into_iter().map(FileEntryResponse::from).collect(),
    }))
}
