//! Spreadsheet import/export API types

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Normalized business values of one spreadsheet row. Empty cells stay as
/// empty strings so reports show exactly what was read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RowData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
}

/// A row that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RowError {
    /// Worksheet row number; the header is row 1
    pub row: u64,
    pub data: RowData,
    pub errors: Vec<String>,
}

/// A valid row the store refused to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreationFailure {
    pub row: u64,
    pub data: RowData,
    pub error: String,
}

/// 400 body of an upload with at least one invalid row. Nothing was
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub message: String,
    pub total_rows: u64,
    pub valid_rows: u64,
    pub error_rows: u64,
    pub errors: Vec<RowError>,
}

/// 201 body of an upload whose rows all validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub message: String,
    pub total_rows: u64,
    pub inserted: u64,
    pub duplicates: u64,
    pub duplicate_errors: Vec<CreationFailure>,
}

/// Multipart body of the upload endpoints.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// `.xlsx` or `.xls` workbook
    #[schema(value_type = String, format = "binary")]
    pub file: Vec<u8>,
}

/// Query string of `GET /api/contacts/export`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportParams {
    /// Comma-separated contact ids; when present, search and filter are ignored
    pub ids: Option<String>,
    pub search: Option<String>,
    /// JSON object of exact-match constraints
    pub filter: Option<String>,
    /// Comma-separated field names (default `name,email,phone,company,address`)
    pub fields: Option<String>,
}
