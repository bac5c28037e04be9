//! Spreadsheet Transfer Routes
//!
//! Upload (validate then import), error-report download and export under
//! `/api/contacts`.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rolodex_storage::SharedStore;

use crate::{
    config::ApiConfig,
    constants::{
        ALLOWED_EXTENSIONS, ERROR_REPORT_FILENAME, EXPORT_FILENAME, OCTET_STREAM_CONTENT_TYPE,
        UPLOAD_FIELD, XLSX_CONTENT_TYPE, XLS_CONTENT_TYPE,
    },
    error::{ApiError, ApiResult},
    services::{self, ImportOutcome},
    spreadsheet::{decode_rows, encode_contacts, encode_error_report},
    state::AppState,
    types::{ExportParams, ImportReport, UploadForm, ValidationReport},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/contacts/upload - Import contacts from a workbook
#[utoipa::path(
    post,
    path = "/api/contacts/upload",
    tag = "Transfer",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Every row validated; creation attempted for each", body = ImportReport),
        (status = 400, description = "Row validation failed; nothing created", body = ValidationReport),
        (status = 413, description = "Upload too large", body = ApiError),
    ),
)]
pub async fn upload_contacts(
    State(store): State<SharedStore>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let bytes = read_upload(multipart).await?;
    let rows = decode_rows(&bytes)?;

    let response = match services::import_rows(store.as_ref(), &rows).await? {
        ImportOutcome::Rejected(report) => (StatusCode::BAD_REQUEST, Json(report)).into_response(),
        ImportOutcome::Completed(report) => (StatusCode::CREATED, Json(report)).into_response(),
    };
    Ok(response)
}

/// POST /api/contacts/upload/error-report - Download row validation failures
#[utoipa::path(
    post,
    path = "/api/contacts/upload/error-report",
    tag = "Transfer",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Error-report workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Missing, unreadable or empty workbook", body = ApiError),
    ),
)]
pub async fn upload_error_report(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let bytes = read_upload(multipart).await?;
    let rows = decode_rows(&bytes)?;
    let errors = services::collect_row_errors(&rows)?;

    tracing::debug!(error_rows = errors.len(), "Error report generated");
    Ok(attachment(encode_error_report(&errors)?, ERROR_REPORT_FILENAME))
}

/// GET /api/contacts/export - Download contacts as a workbook
#[utoipa::path(
    get,
    path = "/api/contacts/export",
    tag = "Transfer",
    params(ExportParams),
    responses(
        (status = 200, description = "Export workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Invalid ids, filter or fields", body = ApiError),
        (status = 404, description = "A listed contact does not exist", body = ApiError),
    ),
)]
pub async fn export_contacts(
    State(store): State<SharedStore>,
    State(config): State<Arc<ApiConfig>>,
    params: Result<Query<ExportParams>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = params?;
    let fields = services::parse_fields(params.fields.as_deref())?;
    let contacts = services::export_selection(store.as_ref(), &params, config.export_limit).await?;

    tracing::info!(records = contacts.len(), columns = fields.len(), "Contacts exported");
    Ok(attachment(encode_contacts(&contacts, &fields)?, EXPORT_FILENAME))
}

// ============================================================================
// HELPERS
// ============================================================================

/// Bytes of the `file` part. Other parts are ignored.
async fn read_upload(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<Vec<u8>> {
    let Ok(mut multipart) = multipart else {
        return Err(ApiError::invalid_input("No file uploaded"));
    };

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        check_file_type(field.file_name(), field.content_type())?;
        let bytes = field.bytes().await?;
        return Ok(bytes.to_vec());
    }

    Err(ApiError::invalid_input("No file uploaded"))
}

/// Accept `.xlsx`/`.xls` names whose declared type, if any, is a
/// spreadsheet type or a generic binary stream.
fn check_file_type(file_name: Option<&str>, content_type: Option<&str>) -> ApiResult<()> {
    let extension_ok = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));

    let content_type_ok = match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.split(';').next().unwrap_or_default().trim();
            [XLSX_CONTENT_TYPE, XLS_CONTENT_TYPE, OCTET_STREAM_CONTENT_TYPE]
                .iter()
                .any(|allowed| ct.eq_ignore_ascii_case(allowed))
        }
    };

    if extension_ok && content_type_ok {
        Ok(())
    } else {
        Err(ApiError::invalid_input(
            "Invalid file format. Only .xlsx and .xls allowed",
        ))
    }
}

fn attachment(bytes: Vec<u8>, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the transfer router. Mounted at `/api/contacts` beside the
/// contact router; `/export` takes precedence over `/:id`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_contacts))
        .route("/upload/error-report", post(upload_error_report))
        .route("/export", get(export_contacts))
}
