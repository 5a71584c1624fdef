//! Tag handlers for Web API.

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;
use std::sync::Arc;

use crate::web::dto::{
    MessageResponse, SearchQuery, SearchResponse, TagRequest, TagsResponse, ValidatedForm,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /tags/{file_path} - Get the tags of a file.
///
/// Unknown paths return an empty list. The path after `/tags/` is taken
/// verbatim, so an absolute local path (as used by folder import) needs its
/// leading `/` kept: `/tags//srv/docs/a.txt` or `/tags/%2Fsrv%2Fdocs%2Fa.txt`.
/// `/tags/srv/docs/a.txt` looks up the relative path `srv/docs/a.txt`.
#[utoipa::path(
    get,
    path = "/tags/{file_path}",
    tag = "tags",
    params(
        ("file_path" = String, Path, description = "Logical file path; a leading '/' must be kept or encoded")
    ),
    responses(
        (status = 200, description = "Tags of the file", body = TagsResponse)
    )
)]
pub async fn get_tags(
    State(state): State<Arc<AppState>>,
    Path(file_path): Path<String>,
) -> Json<TagsResponse> {
    Json(state.tags.get_tags(&file_path).await.into())
}

/// POST /tags - Add tags to a file.
#[utoipa::path(
    post,
    path = "/tags",
    tag = "tags",
    request_body(content = TagRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Tags added", body = MessageResponse),
        (status = 400, description = "Malformed form body"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn add_tags(
    State(state): State<Arc<AppState>>,
    ValidatedForm(req): ValidatedForm<TagRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.tags.add_tags(&req.file_path, &req.tags).await;
    tracing::debug!(file_path = %req.file_path, tags = ?req.tags, "Tags added");
    Ok(Json(MessageResponse::new("Tags added successfully")))
}

/// DELETE /tags - Remove tags from a file.
#[utoipa::path(
    delete,
    path = "/tags",
    tag = "tags",
    request_body(content = TagRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Tags removed", body = MessageResponse),
        (status = 400, description = "Malformed form body"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn remove_tags(
    State(state): State<Arc<AppState>>,
    ValidatedForm(req): ValidatedForm<TagRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.tags.remove_tags(&req.file_path, &req.tags).await;
    tracing::debug!(file_path = %req.file_path, tags = ?req.tags, "Tags removed");
    Ok(Json(MessageResponse::new("Tags removed successfully")))
}

/// GET /search - Find files carrying every given tag.
#[utoipa::path(
    get,
    path = "/search",
    tag = "tags",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching file paths", body = SearchResponse)
    )
)]
pub async fn search_by_tags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let files = state.tags.find_by_tags(&query.tag).await;
    Json(SearchResponse { files })
}
