//! Logging setup for tagvault.
//!
//! Events from this crate follow `logging.level`, request traces from
//! `tower_http` follow `logging.http_level` and the storage and HTTP client
//! stacks follow `logging.dependency_level`. A `RUST_LOG` value replaces the
//! whole filter.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{Result, VaultError};

/// Targets that follow `logging.dependency_level`.
const DEPENDENCY_TARGETS: &[&str] = &[
    "object_store",
    "hyper",
    "hyper_util",
    "h2",
    "reqwest",
    "rustls",
];

/// Parse a level name, case-insensitively.
pub fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn level_or_default(level: &str) -> Level {
    parse_level(level).unwrap_or(Level::INFO)
}

/// Filter directives for a logging configuration.
fn filter_directives(config: &LoggingConfig) -> String {
    let level = level_or_default(&config.level);
    let http = level_or_default(&config.http_level);
    let dependency = level_or_default(&config.dependency_level);

    let mut directives = vec![
        level.to_string().to_lowercase(),
        format!("tower_http={}", http.to_string().to_lowercase()),
    ];
    directives.extend(
        DEPENDENCY_TARGETS
            .iter()
            .map(|target| format!("{target}={}", dependency.to_string().to_lowercase())),
    );
    directives.join(",")
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(config)))
}

/// Initialize logging to stdout and, unless `logging.file` is empty, a log file.
///
/// # Errors
/// `Config` for an unknown level name, `LocalIo` if the log file cannot be created.
pub fn init(config: &LoggingConfig) -> Result<()> {
    for (key, value) in [
        ("logging.level", &config.level),
        ("logging.http_level", &config.http_level),
        ("logging.dependency_level", &config.dependency_level),
    ] {
        if parse_level(value).is_none() {
            return Err(VaultError::Config(format!("{key}: unknown level '{value}'")));
        }
    }

    if config.file.is_empty() {
        init_console_only(&config.level);
        return Ok(());
    }

    if let Some(parent) = Path::new(&config.file).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let log_file = Arc::new(File::options().create(true).append(true).open(&config.file)?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(build_filter(config))
        .init();

    Ok(())
}

/// Initialize console-only logging at `level`, with the default HTTP and
/// dependency levels.
pub fn init_console_only(level: &str) {
    let config = LoggingConfig {
        level: level.to_string(),
        file: String::new(),
        ..Default::default()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(build_filter(&config))
        .init();
}
