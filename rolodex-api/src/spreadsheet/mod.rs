//! Workbook codec
//!
//! Decoding reads the first sheet of an uploaded workbook into header-keyed
//! text rows. Encoding writes contacts or import error rows into a fresh
//! single-sheet .xlsx.

pub mod decode;
pub mod encode;

pub use decode::{decode_rows, SheetRow};
pub use encode::{encode_contacts, encode_error_report, ERROR_REPORT_HEADERS};

use thiserror::Error;

/// Failures of the workbook codec.
#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("workbook could not be read: {0}")]
    Unreadable(String),

    #[error("workbook contains no sheets")]
    NoSheets,

    #[error("workbook could not be written: {0}")]
    Write(String),
}

impl From<calamine::Error> for SpreadsheetError {
    fn from(err: calamine::Error) -> Self {
        SpreadsheetError::Unreadable(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for SpreadsheetError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SpreadsheetError::Write(err.to_string())
    }
}
