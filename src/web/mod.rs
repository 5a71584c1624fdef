//! Web API module for tagvault.
//!
//! An axum HTTP surface over the file manager, folder importer and tag index,
//! with OpenAPI documentation served by Swagger UI.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router, create_swagger_router, ApiDoc};
pub use server::WebServer;
