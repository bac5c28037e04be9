//! Write contacts and import errors into .xlsx workbooks.

use rolodex_core::{Contact, ContactField};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet};

use super::SpreadsheetError;
use crate::constants::{ERROR_SHEET_NAME, EXPORT_SHEET_NAME};
use crate::types::RowError;

/// Column headers of the error report, in order.
pub const ERROR_REPORT_HEADERS: [&str; 7] = [
    "Row Number",
    "Name",
    "Email",
    "Phone",
    "Company",
    "Address",
    "Errors",
];

/// One `Contacts` sheet: a header row of capitalized field names, then one
/// row per contact in the given order.
pub fn encode_contacts(
    contacts: &[Contact],
    fields: &[ContactField],
) -> Result<Vec<u8>, SpreadsheetError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(EXPORT_SHEET_NAME)?;

    let headers: Vec<String> = fields.iter().map(|f| f.header()).collect();
    write_header(sheet, &headers)?;

    for (index, contact) in contacts.iter().enumerate() {
        let row = data_row(index)?;
        for (col, field) in fields.iter().enumerate() {
            sheet.write_string(row, column(col)?, contact.field_text(*field))?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// One `Errors` sheet listing each rejected row with its messages joined by
/// `", "`.
pub fn encode_error_report(errors: &[RowError]) -> Result<Vec<u8>, SpreadsheetError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(ERROR_SHEET_NAME)?;
    write_header(sheet, &ERROR_REPORT_HEADERS)?;

    for (index, error) in errors.iter().enumerate() {
        let row = data_row(index)?;
        sheet.write_number(row, 0, error.row as f64)?;
        let cells = [
            error.data.name.as_str(),
            error.data.email.as_str(),
            error.data.phone.as_str(),
            error.data.company.as_str(),
            error.data.address.as_str(),
        ];
        for (offset, text) in cells.iter().enumerate() {
            sheet.write_string(row, column(offset + 1)?, *text)?;
        }
        sheet.write_string(row, 6, error.errors.join(", "))?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_header<S: AsRef<str>>(sheet: &mut Worksheet, headers: &[S]) -> Result<(), SpreadsheetError> {
    let bold = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, column(col)?, header.as_ref(), &bold)?;
    }
    Ok(())
}

/// Worksheet row for the `index`-th record (row 0 is the header).
fn data_row(index: usize) -> Result<RowNum, SpreadsheetError> {
    RowNum::try_from(index + 1)
        .map_err(|_| SpreadsheetError::Write(format!("row {} out of range", index + 1)))
}

fn column(index: usize) -> Result<ColNum, SpreadsheetError> {
    ColNum::try_from(index)
        .map_err(|_| SpreadsheetError::Write(format!("column {} out of range", index)))
}
