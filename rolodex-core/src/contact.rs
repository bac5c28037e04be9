//! Contact record and its write payloads

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{StoreError, StoreResult};
use crate::field::ContactField;
use crate::identity::{ContactId, Timestamp};

/// A persisted contact.
///
/// The three lock fields are either all unset or all set. They are only
/// written through [`Contact::apply_lock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub address: Option<String>,
    pub is_editing: bool,
    pub editing_by: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub editing_until: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// An advisory edit lock held on a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLock {
    pub owner: String,
    pub until: Timestamp,
}

impl EditLock {
    pub fn new(owner: impl Into<String>, until: Timestamp) -> Self {
        Self {
            owner: owner.into(),
            until,
        }
    }

    /// A lock is live while its expiry is strictly in the future.
    pub fn is_live(&self, now: Timestamp) -> bool {
        now < self.until
    }
}

impl Contact {
    /// Build a fresh record from a checked creation payload.
    pub fn create(new: NewContact, now: Timestamp) -> Self {
        Self {
            id: ContactId::now_v7(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            company: new.company,
            address: new.address,
            is_editing: false,
            editing_by: None,
            editing_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current lock, if all lock fields are set.
    pub fn edit_lock(&self) -> Option<EditLock> {
        match (self.is_editing, &self.editing_by, self.editing_until) {
            (true, Some(owner), Some(until)) => Some(EditLock::new(owner.clone(), until)),
            _ => None,
        }
    }

    /// Whether a live lock held by someone other than `owner` blocks them.
    pub fn is_locked_against(&self, owner: &str, now: Timestamp) -> bool {
        self.edit_lock()
            .map(|lock| lock.is_live(now) && lock.owner != owner)
            .unwrap_or(false)
    }

    /// Set or clear all three lock fields together.
    pub fn apply_lock(&mut self, lock: Option<&EditLock>, now: Timestamp) {
        match lock {
            Some(lock) => {
                self.is_editing = true;
                self.editing_by = Some(lock.owner.clone());
                self.editing_until = Some(lock.until);
            }
            None => {
                self.is_editing = false;
                self.editing_by = None;
                self.editing_until = None;
            }
        }
        self.updated_at = now;
    }

    /// Text rendering of a field, used for export cells.
    ///
    /// Absent optional values render as the empty string.
    pub fn field_text(&self, field: ContactField) -> String {
        match field {
            ContactField::Name => self.name.clone(),
            ContactField::Email => self.email.clone(),
            ContactField::Phone => self.phone.clone(),
            ContactField::Company => self.company.clone().unwrap_or_default(),
            ContactField::Address => self.address.clone().unwrap_or_default(),
            ContactField::IsEditing => self.is_editing.to_string(),
            ContactField::EditingBy => self.editing_by.clone().unwrap_or_default(),
            ContactField::EditingUntil => self
                .editing_until
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            ContactField::CreatedAt => self.created_at.to_rfc3339(),
            ContactField::UpdatedAt => self.updated_at.to_rfc3339(),
        }
    }

    /// Borrow a text field; `None` for absent optional values and for
    /// non-text fields.
    pub fn text_field(&self, field: ContactField) -> Option<&str> {
        match field {
            ContactField::Name => Some(&self.name),
            ContactField::Email => Some(&self.email),
            ContactField::Phone => Some(&self.phone),
            ContactField::Company => self.company.as_deref(),
            ContactField::Address => self.address.as_deref(),
            ContactField::EditingBy => self.editing_by.as_deref(),
            _ => None,
        }
    }

    /// Order two contacts by a single field, ascending. Absent values sort
    /// first.
    pub fn cmp_by(&self, other: &Self, field: ContactField) -> Ordering {
        match field {
            ContactField::IsEditing => self.is_editing.cmp(&other.is_editing),
            ContactField::EditingUntil => self.editing_until.cmp(&other.editing_until),
            ContactField::CreatedAt => self.created_at.cmp(&other.created_at),
            ContactField::UpdatedAt => self.updated_at.cmp(&other.updated_at),
            _ => self.text_field(field).cmp(&other.text_field(field)),
        }
    }
}

// ============================================================================
// WRITE PAYLOADS
// ============================================================================

/// Payload for creating a contact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewContact {
    /// Trim every field, lower-case the email, and drop blank optionals.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
            company: normalize_optional(self.company),
            address: normalize_optional(self.address),
        }
    }

    /// Required-field contract applied on every insert.
    pub fn check(&self) -> StoreResult<()> {
        require(ContactField::Name, &self.name)?;
        require(ContactField::Email, &self.email)?;
        require(ContactField::Phone, &self.phone)?;
        Ok(())
    }
}

/// Partial update of a contact's business fields.
///
/// `None` leaves a field untouched. For `company` and `address` an empty
/// string clears the value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.address.is_none()
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|v| v.trim().to_string()),
            email: self.email.map(|v| v.trim().to_lowercase()),
            phone: self.phone.map(|v| v.trim().to_string()),
            company: self.company.map(|v| v.trim().to_string()),
            address: self.address.map(|v| v.trim().to_string()),
        }
    }

    /// Required fields may be omitted from a patch but never blanked.
    pub fn check(&self) -> StoreResult<()> {
        if let Some(name) = &self.name {
            require(ContactField::Name, name)?;
        }
        if let Some(email) = &self.email {
            require(ContactField::Email, email)?;
        }
        if let Some(phone) = &self.phone {
            require(ContactField::Phone, phone)?;
        }
        Ok(())
    }

    /// Apply the patch in place and bump `updated_at`.
    pub fn apply_to(&self, contact: &mut Contact, now: Timestamp) {
        if let Some(name) = &self.name {
            contact.name = name.clone();
        }
        if let Some(email) = &self.email {
            contact.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            contact.phone = phone.clone();
        }
        if let Some(company) = &self.company {
            contact.company = normalize_optional(Some(company.clone()));
        }
        if let Some(address) = &self.address {
            contact.address = normalize_optional(Some(address.clone()));
        }
        contact.updated_at = now;
    }
}

fn require(field: ContactField, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::required(field));
    }
    Ok(())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
