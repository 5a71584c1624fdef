//! Request DTOs for the web API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::no_control_chars;

/// Multipart upload body, for API documentation only.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// File content.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Object key to store under; defaults to the file's base name.
    pub object_name: Option<String>,
}

/// Add or remove tags for a file.
///
/// Sent as `application/x-www-form-urlencoded` with `tags` repeated once per tag.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TagRequest {
    /// Logical file path.
    #[validate(
        length(min = 1, max = 4096, message = "file_path is required"),
        custom(function = "no_control_chars")
    )]
    pub file_path: String,
    /// Tags to add or remove.
    #[serde(default)]
    #[validate(length(min = 1, message = "at least one tag is required"))]
    pub tags: Vec<String>,
}

/// Import or delete a local folder.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FolderRequest {
    /// Local folder path on the server.
    #[validate(
        length(min = 1, max = 4096, message = "folder_path is required"),
        custom(function = "no_control_chars")
    )]
    pub folder_path: String,
    /// Prefix for object keys (optional).
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub dest_prefix: String,
}

/// Tag search query (`?tag=a&tag=b`).
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Tags every result must carry.
    #[serde(default)]
    pub tag: Vec<String>,
}
