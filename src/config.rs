//! Configuration module for tagvault.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            cors_origins: vec![],
        }
    }
}

/// Object store backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Amazon S3 or an S3-compatible service.
    S3,
    /// Directory on the local filesystem.
    Local,
    /// Process-local memory (development and tests).
    Memory,
}

/// Object store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend to construct.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Bucket name.
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,
    /// Region name.
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores (e.g. MinIO).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Use `endpoint_url` instead of the native AWS endpoint.
    #[serde(default)]
    pub use_s3_compatible: bool,
    /// Root directory for the `local` backend.
    #[serde(default = "default_local_root")]
    pub local_root: String,
}

fn default_backend() -> StorageBackend {
    StorageBackend::S3
}

fn default_bucket_name() -> String {
    "tagvault".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_local_root() -> String {
    "data/objects".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            bucket_name: default_bucket_name(),
            region: default_region(),
            endpoint_url: None,
            use_s3_compatible: false,
            local_root: default_local_root(),
        }
    }
}

/// Duplicate detection strategy used before uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupMode {
    /// Hash `s3://{bucket}/{key}` as if it were a local path.
    ///
    /// That path never exists, so no upload is ever reported as a duplicate.
    #[default]
    Legacy,
    /// Fetch each stored object and hash its bytes.
    Content,
}

/// Upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Directory for staging multipart uploads.
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: String,
    /// Duplicate detection strategy.
    #[serde(default)]
    pub dedup: DedupMode,
}

fn default_max_upload_size() -> u64 {
    10
}

fn default_tmp_dir() -> String {
    std::env::temp_dir().to_string_lossy().into_owned()
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            max_upload_size_mb: default_max_upload_size(),
            tmp_dir: default_tmp_dir(),
            dedup: DedupMode::default(),
        }
    }
}

/// Folder import configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Maximum number of uploads running at once during a folder import.
    #[serde(default = "default_max_concurrent_uploads")]
    pub max_concurrent_uploads: usize,
}

fn default_max_concurrent_uploads() -> usize {
    4
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_concurrent_uploads: default_max_concurrent_uploads(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Level for HTTP request traces.
    #[serde(default = "default_log_level")]
    pub http_level: String,
    /// Level for the object store and HTTP client crates.
    #[serde(default = "default_dependency_log_level")]
    pub dependency_level: String,
    /// Path to the log file; empty logs to stdout only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dependency_log_level() -> String {
    "warn".to_string()
}

fn default_log_file() -> String {
    "logs/tagvault.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            http_level: default_log_level(),
            dependency_level: default_dependency_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Object store configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upload configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Folder import configuration.
    #[serde(default)]
    pub import: ImportConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VaultError::LocalIo)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `TAGVAULT_BUCKET_NAME`: bucket name
    /// - `TAGVAULT_ENDPOINT_URL`: custom S3-compatible endpoint (also enables it)
    /// - `TAGVAULT_PORT`: HTTP listen port
    ///
    /// Empty or unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bucket) = std::env::var("TAGVAULT_BUCKET_NAME") {
            if !bucket.is_empty() {
                self.storage.bucket_name = bucket;
            }
        }

        if let Ok(endpoint) = std::env::var("TAGVAULT_ENDPOINT_URL") {
            if !endpoint.is_empty() {
                self.storage.endpoint_url = Some(endpoint);
                self.storage.use_s3_compatible = true;
            }
        }

        if let Ok(port) = std::env::var("TAGVAULT_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the S3 backend is selected with an empty bucket name
    /// - `use_s3_compatible` is set without an `endpoint_url`
    /// - `max_concurrent_uploads` is zero
    pub fn validate(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket_name.is_empty() {
            return Err(VaultError::Config("storage.bucket_name must not be empty".to_string()));
        }

        if self.storage.use_s3_compatible
            && self
                .storage
                .endpoint_url
                .as_deref()
                .map_or(true, str::is_empty)
        {
            return Err(VaultError::Config(
                "storage.use_s3_compatible is set but storage.endpoint_url is missing. \
                 Set it in config.toml or via TAGVAULT_ENDPOINT_URL environment variable."
                    .to_string(),
            ));
        }

        if self.import.max_concurrent_uploads == 0 {
            return Err(VaultError::Config(
                "import.max_concurrent_uploads must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
