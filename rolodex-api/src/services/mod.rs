//! Service Layer
//!
//! Business rules that sit between the route handlers and the contact
//! store: edit locking, query composition, and spreadsheet import.

mod import_service;
mod lock_service;
mod query_service;
pub mod row_validator;

pub use import_service::*;
pub use lock_service::*;
pub use query_service::*;
pub use row_validator::{validate_row, validate_rows, RowPartition, ValidRow};
