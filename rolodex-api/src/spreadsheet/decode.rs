//! Read the first sheet of a workbook into text rows.

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::Timelike;
use std::collections::HashMap;
use std::io::Cursor;

use super::SpreadsheetError;

/// One data row keyed by the header text of its column.
///
/// Every cell is rendered as text. Cells missing from the sheet read as the
/// empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    cells: HashMap<String, String>,
}

impl SheetRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(header, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(header.into(), value.into());
    }

    /// Cell text under `header`, or `""` when the column is absent.
    pub fn get(&self, header: &str) -> &str {
        self.cells.get(header).map(String::as_str).unwrap_or("")
    }

    fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }
}

/// Decode the first sheet of an .xlsx or .xls payload.
///
/// The first row holds the headers. Columns with an empty header are
/// ignored, and rows whose cells are all empty are skipped, so a sheet with
/// only a header row decodes to no rows.
pub fn decode_rows(bytes: &[u8]) -> Result<Vec<SheetRow>, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoSheets)??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();

    let mut decoded = Vec::new();
    for row in rows {
        let mut sheet_row = SheetRow::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            sheet_row.insert(header.clone(), cell_text(cell));
        }
        if !sheet_row.is_blank() {
            decoded.push(sheet_row);
        }
    }

    tracing::debug!(rows = decoded.len(), columns = headers.len(), "Decoded workbook");
    Ok(decoded)
}

/// Render a cell as text. Integral floats drop the fractional part, so a
/// phone number typed as a number reads back as its digits.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(v) => v.clone(),
        Data::Int(v) => v.to_string(),
        Data::Float(v) => float_text(*v),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(v) => date_text(v),
        Data::DateTimeIso(v) => v.clone(),
        Data::DurationIso(v) => v.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Date cells read as `YYYY-MM-DD`, with the time appended when it is not
/// midnight. Durations keep their serial value.
fn date_text(value: &ExcelDateTime) -> String {
    if value.is_duration() {
        return float_text(value.as_f64());
    }
    match value.as_datetime() {
        Some(dt) if dt.num_seconds_from_midnight() == 0 => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => float_text(value.as_f64()),
    }
}

fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook};

    fn workbook(build: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        build(sheet);
        workbook.save_to_buffer().expect("write xlsx bytes")
    }

    #[test]
    fn test_decode_keys_rows_by_header() {
        let bytes = workbook(|sheet| {
            sheet.write_string(0, 0, "Name").unwrap();
            sheet.write_string(0, 1, "Email").unwrap();
            sheet.write_string(0, 2, "Phone").unwrap();
            sheet.write_string(1, 0, "Jane Doe").unwrap();
            sheet.write_string(1, 1, "jane@example.com").unwrap();
            sheet.write_number(1, 2, 5551234567.0).unwrap();
            sheet.write_string(2, 0, "Bob").unwrap();
        });

        let rows = decode_rows(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), "Jane Doe");
        assert_eq!(rows[0].get("Phone"), "5551234567");
        assert_eq!(rows[1].get("Email"), "");
        assert_eq!(rows[1].get("Company"), "");
    }

    #[test]
    fn test_decode_skips_blank_rows_and_headerless_columns() {
        let bytes = workbook(|sheet| {
            sheet.write_string(0, 0, "name").unwrap();
            sheet.write_string(0, 2, "note").unwrap();
            sheet.write_string(1, 0, "Jane").unwrap();
            sheet.write_string(1, 1, "orphan").unwrap();
            sheet.write_string(3, 0, "Bob").unwrap();
            sheet.write_boolean(3, 2, true).unwrap();
        });

        let rows = decode_rows(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), "Jane");
        assert_eq!(rows[1].get("note"), "TRUE");
        assert!(rows.iter().all(|r| r.get("") == ""));
    }

    #[test]
    fn test_date_cells_read_as_dates() {
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let stamp_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        let bytes = workbook(|sheet| {
            sheet.write_string(0, 0, "Name").unwrap();
            sheet.write_string(0, 1, "Address").unwrap();
            sheet.write_string(0, 2, "Company").unwrap();
            sheet.write_string(1, 0, "Jane").unwrap();
            let day = rust_xlsxwriter::ExcelDateTime::from_ymd(2024, 1, 1).unwrap();
            sheet.write_datetime_with_format(1, 1, &day, &date_format).unwrap();
            let stamp = rust_xlsxwriter::ExcelDateTime::from_ymd(2024, 3, 5)
                .unwrap()
                .and_hms(13, 45, 0)
                .unwrap();
            sheet.write_datetime_with_format(1, 2, &stamp, &stamp_format).unwrap();
        });

        let rows = decode_rows(&bytes).unwrap();
        assert_eq!(rows[0].get("Address"), "2024-01-01");
        assert_eq!(rows[0].get("Company"), "2024-03-05 13:45:00");
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let bytes = workbook(|sheet| {
            sheet.write_string(0, 0, "Name").unwrap();
        });
        assert!(decode_rows(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let err = decode_rows(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, SpreadsheetError::Unreadable(_)));
    }

    #[test]
    fn test_float_text() {
        assert_eq!(float_text(5551234567.0), "5551234567");
        assert_eq!(float_text(1.5), "1.5");
    }
}
