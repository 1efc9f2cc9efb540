//! HTTP server for the Stacks e-book service.

pub mod catalog;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use catalog::{Catalog, UploadRequest};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
