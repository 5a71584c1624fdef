//! Error types for tagvault.

use thiserror::Error;

/// Common error type for tagvault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Local I/O error (unreadable file, missing directory, ...).
    #[error("local I/O error: {0}")]
    LocalIo(#[from] std::io::Error),

    /// Object store operation failed.
    ///
    /// Covers network, credential and backend errors. Missing keys are
    /// reported as [`VaultError::NotFound`] instead.
    #[error("storage error: {0}")]
    Storage(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<object_store::Error> for VaultError {
    fn from(e: object_store::Error) -> Self {
        match e {
            object_store::Error::NotFound { path, .. } => {
                VaultError::NotFound(format!("object '{path}'"))
            }
            other => VaultError::Storage(other.to_string()),
        }
    }
}

/// Result type alias for tagvault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = VaultError::Storage("connection refused".to_string());
        assert_eq!(err.to_string(), "storage error: connection refused");
    }

    #[test]
    fn test_validation_error_display() {
        let err = VaultError::Validation("tag list is empty".to_string());
        assert_eq!(err.to_string(), "validation error: tag list is empty");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = VaultError::NotFound("folder".to_string());
        assert_eq!(err.to_string(), "folder not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VaultError = io_err.into();
        assert!(matches!(err, VaultError::LocalIo(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_object_store_not_found_conversion() {
        let store_err = object_store::Error::NotFound {
            path: "docs/a.txt".to_string(),
            source: "missing".into(),
        };
        let err: VaultError = store_err.into();
        assert!(matches!(err, VaultError::NotFound(_)));
        assert!(err.to_string().contains("docs/a.txt"));
    }

    #[test]
    fn test_object_store_generic_conversion() {
        let store_err = object_store::Error::Generic {
            store: "S3",
            source: "access denied".into(),
        };
        let err: VaultError = store_err.into();
        assert!(matches!(err, VaultError::Storage(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(VaultError::Config("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
