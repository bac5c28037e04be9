//! Constants for Rolodex API
//!
//! This module contains all constant values used throughout the API.
//! Centralizing constants makes them easy to find, modify, and test.

use std::time::Duration;

// ============================================================================
// EDIT LOCKS
// ============================================================================

/// How long an edit lock lasts after it is taken (10 minutes)
pub const EDIT_LOCK_TTL: Duration = Duration::from_secs(10 * 60);

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

/// Browser client origin allowed when nothing is configured
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

// ============================================================================
// PAGINATION
// ============================================================================

/// Page used when the query omits one
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when the query omits one
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Maximum page size for list operations
pub const MAX_PAGE_SIZE: u64 = 1000;

// ============================================================================
// SPREADSHEET TRANSFER
// ============================================================================

/// Upload size limit (50 MiB)
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Maximum number of records a filter-based export writes
pub const EXPORT_LIMIT: u64 = 10_000;

/// Multipart field carrying the workbook
pub const UPLOAD_FIELD: &str = "file";

/// Accepted file extensions, lower-case
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Content type of an .xlsx workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Content type of a legacy .xls workbook
pub const XLS_CONTENT_TYPE: &str = "application/vnd.ms-excel";

/// Generic binary content type some clients send for any file
pub const OCTET_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

/// Sheet name of an export workbook
pub const EXPORT_SHEET_NAME: &str = "Contacts";

/// Sheet name of an error-report workbook
pub const ERROR_SHEET_NAME: &str = "Errors";

/// Download name of an export
pub const EXPORT_FILENAME: &str = "contacts-export.xlsx";

/// Download name of an error report
pub const ERROR_REPORT_FILENAME: &str = "contacts-errors.xlsx";

// ============================================================================
// SERVER
// ============================================================================

/// Port used when neither PORT nor ROLODEX_API_PORT is set
pub const DEFAULT_PORT: u16 = 5000;
