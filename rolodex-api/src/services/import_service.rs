//! Spreadsheet Import Service
//!
//! Validate every row first; only a fully valid sheet is written. Rows are
//! then created one at a time in sheet order, and creation failures are
//! collected instead of aborting the import.

use rolodex_core::StoreError;
use rolodex_storage::ContactStore;

use crate::error::{ApiError, ApiResult};
use crate::services::row_validator::validate_rows;
use crate::spreadsheet::SheetRow;
use crate::types::{CreationFailure, ImportReport, RowError, ValidationReport};

/// Result of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// At least one row failed validation; nothing was written.
    Rejected(ValidationReport),
    /// Every row validated and creation was attempted for each.
    Completed(ImportReport),
}

/// Validate and create the decoded rows of an upload.
///
/// # Errors
/// - `InvalidInput` ("Excel file is empty") if there are no data rows
/// - store backend failures, which stop the import where they occur
pub async fn import_rows(store: &dyn ContactStore, rows: &[SheetRow]) -> ApiResult<ImportOutcome> {
    ensure_not_empty(rows)?;

    let partition = validate_rows(rows);
    let total_rows = partition.total() as u64;

    if !partition.invalid.is_empty() {
        tracing::info!(
            total_rows,
            error_rows = partition.invalid.len(),
            "Upload rejected by row validation"
        );
        return Ok(ImportOutcome::Rejected(ValidationReport {
            message: "Validation errors found".to_string(),
            total_rows,
            valid_rows: partition.valid.len() as u64,
            error_rows: partition.invalid.len() as u64,
            errors: partition.invalid,
        }));
    }

    let mut inserted = 0u64;
    let mut failures = Vec::new();
    for valid in partition.valid {
        match store.insert(valid.contact).await {
            Ok(_) => inserted += 1,
            Err(err @ (StoreError::Duplicate { .. } | StoreError::Invalid { .. })) => {
                failures.push(CreationFailure {
                    row: valid.row,
                    data: valid.data,
                    error: err.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        }
    }

    tracing::info!(total_rows, inserted, duplicates = failures.len(), "Upload completed");
    Ok(ImportOutcome::Completed(ImportReport {
        message: "Upload completed".to_string(),
        total_rows,
        inserted,
        duplicates: failures.len() as u64,
        duplicate_errors: failures,
    }))
}

/// Validation failures of an upload, without writing anything.
pub fn collect_row_errors(rows: &[SheetRow]) -> ApiResult<Vec<RowError>> {
    ensure_not_empty(rows)?;
    Ok(validate_rows(rows).invalid)
}

fn ensure_not_empty(rows: &[SheetRow]) -> ApiResult<()> {
    if rows.is_empty() {
        return Err(ApiError::invalid_input("Excel file is empty"));
    }
    Ok(())
}
