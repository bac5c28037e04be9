//! Spreadsheet row validation
//!
//! Every rule runs on every row, so a rejected row reports all of its
//! problems at once. Uniqueness is left to the store.

use once_cell::sync::Lazy;
use regex::Regex;
use rolodex_core::NewContact;

use crate::spreadsheet::SheetRow;
use crate::types::{RowData, RowError};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

/// Minimum digits in a phone number after separators are removed.
pub const MIN_PHONE_DIGITS: usize = 10;

/// A row that passed validation, ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRow {
    pub row: u64,
    pub data: RowData,
    pub contact: NewContact,
}

/// Rows split by validation outcome, each side in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowPartition {
    pub valid: Vec<ValidRow>,
    pub invalid: Vec<RowError>,
}

impl RowPartition {
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }
}

/// Worksheet row number of the `index`-th data row. The header is row 1.
pub fn sheet_row_number(index: usize) -> u64 {
    index as u64 + 2
}

/// Validate one decoded row.
pub fn validate_row(index: usize, row: &SheetRow) -> Result<ValidRow, RowError> {
    let data = normalize(row);
    let errors = check(&data);
    let row = sheet_row_number(index);

    if !errors.is_empty() {
        return Err(RowError { row, data, errors });
    }

    let contact = NewContact {
        name: data.name.clone(),
        email: data.email.clone(),
        phone: data.phone.clone(),
        company: Some(data.company.clone()),
        address: Some(data.address.clone()),
    }
    .normalized();
    Ok(ValidRow { row, data, contact })
}

pub fn validate_rows(rows: &[SheetRow]) -> RowPartition {
    let mut partition = RowPartition::default();
    for (index, row) in rows.iter().enumerate() {
        match validate_row(index, row) {
            Ok(valid) => partition.valid.push(valid),
            Err(invalid) => partition.invalid.push(invalid),
        }
    }
    partition
}

/// Read the business columns, preferring the capitalized header.
fn normalize(row: &SheetRow) -> RowData {
    RowData {
        name: pick(row, "Name", "name").trim().to_string(),
        email: pick(row, "Email", "email").trim().to_lowercase(),
        phone: pick(row, "Phone", "phone").trim().to_string(),
        company: pick(row, "Company", "company").trim().to_string(),
        address: pick(row, "Address", "address").trim().to_string(),
    }
}

fn pick<'a>(row: &'a SheetRow, capitalized: &str, lower: &str) -> &'a str {
    let value = row.get(capitalized);
    if value.is_empty() {
        row.get(lower)
    } else {
        value
    }
}

fn check(data: &RowData) -> Vec<String> {
    let mut errors = Vec::new();

    if data.name.is_empty() {
        errors.push("Name is required".to_string());
    }
    if data.email.is_empty() {
        errors.push("Email is required".to_string());
    }
    if data.phone.is_empty() {
        errors.push("Phone is required".to_string());
    }
    if !data.email.is_empty() && !EMAIL_PATTERN.is_match(&data.email) {
        errors.push("Invalid email format".to_string());
    }
    if !data.phone.is_empty() && phone_digits(&data.phone) < MIN_PHONE_DIGITS {
        errors.push(format!("Phone must be at least {} digits", MIN_PHONE_DIGITS));
    }

    errors
}

/// Digits left once whitespace, parentheses and dashes are stripped.
fn phone_digits(phone: &str) -> usize {
    phone
        .chars()
        .filter(|c| !(c.is_whitespace() || matches!(c, '(' | ')' | '-')))
        .filter(char::is_ascii_digit)
        .count()
}
