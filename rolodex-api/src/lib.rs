//! Rolodex API - REST Layer for the Contact Book
//!
//! Exposes contact CRUD, advisory edit locks, list queries and spreadsheet
//! import/export over Axum. Records live behind the `ContactStore` trait:
//! PostgreSQL in production, in memory for development and tests.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod extractors;
pub mod jobs;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod spreadsheet;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::{ApiConfig, StoreBackend};
pub use db::{DbConfig, PgContactStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use types::*;
