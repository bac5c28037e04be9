//! Record selection: search term, equality filters and sort order
//!
//! [`ContactSelector`] is evaluated directly by the in-memory store and
//! translated to SQL by the PostgreSQL store. Both must agree, so the
//! matching rules live here as plain functions over [`Contact`].

use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use thiserror::Error;

use crate::contact::Contact;
use crate::field::{ContactField, UnknownFieldError};

/// Errors from parsing a filter object or a sort expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("filter must be a JSON object")]
    FilterNotObject,

    #[error("{0}")]
    UnknownField(#[from] UnknownFieldError),

    #[error("field '{0}' cannot be used in a filter")]
    NotFilterable(ContactField),

    #[error("unsupported filter value for field '{0}'")]
    UnsupportedValue(ContactField),
}

/// The value side of an equality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    /// Matches records where the field is absent.
    Null,
}

/// A single `field == value` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: ContactField,
    pub value: FilterValue,
}

impl FieldFilter {
    pub fn new(field: ContactField, value: FilterValue) -> Self {
        Self { field, value }
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        match (&self.value, self.field) {
            (FilterValue::Bool(expected), ContactField::IsEditing) => contact.is_editing == *expected,
            (FilterValue::Bool(_), _) => false,
            (FilterValue::Null, field) => {
                field.is_optional_text() && contact.text_field(field).is_none()
            }
            (FilterValue::Text(_), ContactField::IsEditing) => false,
            (FilterValue::Text(expected), field) => {
                contact.text_field(field) == Some(expected.as_str())
            }
        }
    }
}

/// Which records a query touches: an optional search term ANDed with every
/// filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactSelector {
    pub search: Option<String>,
    pub filters: Vec<FieldFilter>,
}

impl ContactSelector {
    pub fn all() -> Self {
        Self::default()
    }

    /// The term is matched as given. Only the empty string is dropped, so it
    /// matches everything.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.is_empty() { None } else { Some(term) };
        self
    }

    pub fn with_filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = FieldFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn matches(&self, contact: &Contact) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .map(|term| matches_search(contact, term))
            .unwrap_or(true);
        search_ok && self.filters.iter().all(|f| f.matches(contact))
    }

    /// Parse a JSON filter object such as `{"company": "Acme"}`.
    ///
    /// Strings and numbers become text constraints, booleans constrain
    /// `isEditing`, and `null` selects records missing an optional field.
    pub fn parse_filters(value: &JsonValue) -> Result<Vec<FieldFilter>, SelectorError> {
        let object = value.as_object().ok_or(SelectorError::FilterNotObject)?;
        let mut filters = Vec::with_capacity(object.len());
        for (key, raw) in object {
            let field: ContactField = key.parse()?;
            if !field.is_filterable() {
                return Err(SelectorError::NotFilterable(field));
            }
            let value = match raw {
                JsonValue::String(s) => FilterValue::Text(s.clone()),
                JsonValue::Number(n) => FilterValue::Text(n.to_string()),
                JsonValue::Bool(b) => FilterValue::Bool(*b),
                JsonValue::Null => FilterValue::Null,
                _ => return Err(SelectorError::UnsupportedValue(field)),
            };
            filters.push(FieldFilter::new(field, value));
        }
        Ok(filters)
    }
}

/// Case-insensitive substring match on name, email or phone.
pub fn matches_search(contact: &Contact, term: &str) -> bool {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [&contact.name, &contact.email, &contact.phone]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
}

/// Sort order for listing. A leading `-` on the wire means descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: ContactField,
    pub descending: bool,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::ascending(ContactField::Name)
    }
}

impl SortOrder {
    pub fn ascending(field: ContactField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn descending(field: ContactField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Parse `name`, `-createdAt`, etc. Blank input yields the default.
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::default());
        }
        match raw.strip_prefix('-') {
            Some(rest) => Ok(Self::descending(rest.parse()?)),
            None => Ok(Self::ascending(raw.parse()?)),
        }
    }

    /// Total order: the sort field, then creation time, then id.
    pub fn compare(&self, a: &Contact, b: &Contact) -> Ordering {
        let primary = a.cmp_by(b, self.field);
        let primary = if self.descending {
            primary.reverse()
        } else {
            primary
        };
        primary
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}
