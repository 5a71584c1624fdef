//! Test helpers for web API integration tests.
//!
//! Builds an in-memory application state and wraps the router in an
//! `axum_test::TestServer`.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum_test::{TestRequest, TestServer};
use tempfile::TempDir;

use tagvault::config::ServerConfig;
use tagvault::file::{FileManager, ObjectStoreClient};
use tagvault::web::{create_health_router, create_router, AppState};
use tagvault::DedupMode;

/// Bucket name used by every test state.
pub const TEST_BUCKET: &str = "test-bucket";

/// A running test server with direct access to its state.
pub struct TestContext {
    pub server: TestServer,
    pub state: Arc<AppState>,
    /// Upload spool directory; removed on drop.
    pub spool: TempDir,
}

/// Create a test context backed by an in-memory object store.
pub fn create_test_context() -> TestContext {
    create_test_context_with(DedupMode::Legacy, 10)
}

/// Create a test context with a given dedup mode and upload limit.
pub fn create_test_context_with(dedup: DedupMode, max_upload_size_mb: u64) -> TestContext {
    build_test_context(dedup, max_upload_size_mb, &ServerConfig::default())
}

/// Create a test context with custom server settings.
pub fn create_test_context_with_server(server_config: &ServerConfig) -> TestContext {
    build_test_context(DedupMode::Legacy, 10, server_config)
}

fn build_test_context(
    dedup: DedupMode,
    max_upload_size_mb: u64,
    server_config: &ServerConfig,
) -> TestContext {
    let spool = TempDir::new().expect("Failed to create spool dir");

    let files = FileManager::new(ObjectStoreClient::in_memory(TEST_BUCKET)).with_dedup_mode(dedup);
    let state = Arc::new(
        AppState::new(files)
            .with_max_upload_size_mb(max_upload_size_mb)
            .with_tmp_dir(spool.path()),
    );

    let router = create_router(state.clone(), server_config).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestContext {
        server,
        state,
        spool,
    }
}

/// Build an `application/x-www-form-urlencoded` body, keeping repeated keys.
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Attach a form body to a request.
pub fn with_form(request: TestRequest, pairs: &[(&str, &str)]) -> TestRequest {
    request
        .bytes(form_body(pairs).into())
        .content_type("application/x-www-form-urlencoded")
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(path, content).expect("Failed to write test file");
}
