//! Contact field model
//!
//! A closed set of field names shared by filtering, sorting and export.
//! Parsing from wire names happens once at the boundary; everything below
//! works with [`ContactField`] and never with raw strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named field of a contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum ContactField {
    Name,
    Email,
    Phone,
    Company,
    Address,
    IsEditing,
    EditingBy,
    EditingUntil,
    CreatedAt,
    UpdatedAt,
}

impl ContactField {
    /// The five user-facing fields, in export column order.
    pub const BUSINESS: [ContactField; 5] = [
        ContactField::Name,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Company,
        ContactField::Address,
    ];

    /// Name used in JSON bodies and query strings.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Company => "company",
            ContactField::Address => "address",
            ContactField::IsEditing => "isEditing",
            ContactField::EditingBy => "editingBy",
            ContactField::EditingUntil => "editingUntil",
            ContactField::CreatedAt => "createdAt",
            ContactField::UpdatedAt => "updatedAt",
        }
    }

    /// Column name in the `contacts` table.
    pub fn column(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Company => "company",
            ContactField::Address => "address",
            ContactField::IsEditing => "is_editing",
            ContactField::EditingBy => "editing_by",
            ContactField::EditingUntil => "editing_until",
            ContactField::CreatedAt => "created_at",
            ContactField::UpdatedAt => "updated_at",
        }
    }

    /// Spreadsheet column header: the wire name with its first letter
    /// upper-cased (`name` -> `Name`).
    pub fn header(&self) -> String {
        let name = self.wire_name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_business(&self) -> bool {
        Self::BUSINESS.contains(self)
    }

    /// Whether equality filters may target this field.
    ///
    /// Timestamps are excluded: exact-instant equality is never what a
    /// caller means and the text forms differ between stores.
    pub fn is_filterable(&self) -> bool {
        !matches!(
            self,
            ContactField::EditingUntil | ContactField::CreatedAt | ContactField::UpdatedAt
        )
    }

    /// Fields stored as nullable text.
    pub fn is_optional_text(&self) -> bool {
        matches!(
            self,
            ContactField::Company | ContactField::Address | ContactField::EditingBy
        )
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Error when a field name does not name a contact field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFieldError(pub String);

impl fmt::Display for UnknownFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown contact field: {}", self.0)
    }
}

impl std::error::Error for UnknownFieldError {}

impl FromStr for ContactField {
    type Err = UnknownFieldError;

    /// Accepts the wire name. Snake-case column names are accepted too so
    /// `created_at` and `createdAt` both work in query strings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim() {
            "name" => ContactField::Name,
            "email" => ContactField::Email,
            "phone" => ContactField::Phone,
            "company" => ContactField::Company,
            "address" => ContactField::Address,
            "isEditing" | "is_editing" => ContactField::IsEditing,
            "editingBy" | "editing_by" => ContactField::EditingBy,
            "editingUntil" | "editing_until" => ContactField::EditingUntil,
            "createdAt" | "created_at" => ContactField::CreatedAt,
            "updatedAt" | "updated_at" => ContactField::UpdatedAt,
            other => return Err(UnknownFieldError(other.to_string())),
        };
        Ok(field)
    }
}
