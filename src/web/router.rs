//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{
    FailureResponse, FileContentResponse, FileEntryResponse, FileListResponse,
    FolderDeleteResponse, FolderRequest, ImportResponse, MessageResponse, SearchResponse,
    TagRequest, TagsResponse, UploadForm, UploadResponse,
};
use super::handlers::{self, AppState};
use super::middleware::create_cors_layer;
use crate::config::ServerConfig;

/// Headroom for multipart boundaries and the `object_name` field.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// OpenAPI document for the tagvault API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "tagvault API",
        version = "v1",
        description = "Object storage with duplicate detection, folder import and tagging"
    ),
    paths(
        handlers::file::upload_file,
        handlers::file::get_file,
        handlers::file::delete_file,
        handlers::file::list_files,
        handlers::tag::get_tags,
        handlers::tag::add_tags,
        handlers::tag::remove_tags,
        handlers::tag::search_by_tags,
        handlers::folder::import_folder,
        handlers::folder::delete_folder,
    ),
    components(schemas(
        UploadForm,
        UploadResponse,
        FileContentResponse,
        FileEntryResponse,
        FileListResponse,
        MessageResponse,
        TagRequest,
        TagsResponse,
        SearchResponse,
        FolderRequest,
        ImportResponse,
        FolderDeleteResponse,
        FailureResponse,
    )),
    tags(
        (name = "files", description = "Upload, read, list and delete objects"),
        (name = "tags", description = "Per-file tags and tag search"),
        (name = "folders", description = "Bulk folder import and deletion")
    )
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, config: &ServerConfig) -> Router {
    let body_limit = usize::try_from(app_state.max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let file_routes = Router::new()
        .route("/upload", post(handlers::upload_file))
        .route("/files", get(handlers::list_files))
        .route(
            "/files/*object_name",
            get(handlers::get_file).delete(handlers::delete_file),
        );

    let tag_routes = Router::new()
        .route("/tags", post(handlers::add_tags).delete(handlers::remove_tags))
        .route("/tags/*file_path", get(handlers::get_tags))
        .route("/search", get(handlers::search_by_tags));

    let folder_routes = Router::new()
        .route("/folders/import", post(handlers::import_folder))
        .route("/folders/delete", post(handlers::delete_folder));

    // Folder jobs are not bound by the request timeout.
    let timed_routes = Router::new()
        .merge(file_routes)
        .merge(tag_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )));

    Router::new()
        .merge(timed_routes)
        .merge(folder_routes)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(create_cors_layer(&config.cors_origins))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the Swagger UI router serving `/swagger-ui` and the OpenAPI JSON.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
