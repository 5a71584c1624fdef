//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use axum_extra::extract::Form;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A form extractor that validates the request body.
///
/// The body is decoded as `application/x-www-form-urlencoded` with
/// `axum_extra`'s `Form`, so repeated keys (`tags=a&tags=b`) collect into a
/// `Vec`. The decoded value is then checked with the `validator` crate and
/// field-level failures are reported as a `VALIDATION_ERROR`.
///
/// # Example
///
/// ```ignore
/// use tagvault::web::dto::ValidatedForm;
///
/// async fn add_tags(
///     ValidatedForm(payload): ValidatedForm<TagRequest>,
/// ) -> Result<Json<MessageResponse>, ApiError> {
///     // payload is already validated
///     // ...
/// }
/// ```
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedForm(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value.chars().any(|c| c.is_control()) {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

/// Reduce a client-supplied file name to its final path component.
///
/// Returns `None` when nothing usable remains (empty, `.`, `..`, or a bare
/// directory separator).
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next()?.trim();
    let name: String = name.chars().filter(|c| !c.is_control()).collect();
    match name.as_str() {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_control_chars_valid() {
        assert!(no_control_chars("/data/report.csv").is_ok());
        assert!(no_control_chars("with space").is_ok());
    }

    #[test]
    fn test_no_control_chars_invalid() {
        assert!(no_control_chars("Hello\x00World").is_err()); // NULL byte
        assert!(no_control_chars("Hello\x1bWorld").is_err()); // Escape
        assert!(no_control_chars("two\nlines").is_err());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.csv").as_deref(), Some("report.csv"));
        assert_eq!(
            sanitize_file_name("../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\me\\notes.txt").as_deref(),
            Some("notes.txt")
        );
        assert_eq!(sanitize_file_name("a\x00b.txt").as_deref(), Some("ab.txt"));
    }

    #[test]
    fn test_sanitize_file_name_rejects_empty() {
        assert!(sanitize_file_name("").is_none());
        assert!(sanitize_file_name("dir/").is_none());
        assert!(sanitize_file_name("..").is_none());
        assert!(sanitize_file_name("   ").is_none());
    }
}
