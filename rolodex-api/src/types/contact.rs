//! Contact-related API types

use rolodex_core::{Contact, ContactPatch, NewContact};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::validation::HasUpdates;

/// A JSON scalar accepted where text is expected. Clients commonly send
/// phone numbers as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextScalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl TextScalar {
    fn into_text(self) -> String {
        match self {
            TextScalar::Text(text) => text,
            TextScalar::Number(number) => number.to_string(),
            TextScalar::Flag(flag) => flag.to_string(),
        }
    }
}

/// Text field that also takes a number or boolean; `null` reads as empty.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TextScalar>::deserialize(deserializer)?
        .map(TextScalar::into_text)
        .unwrap_or_default())
}

/// Optional text field that also takes a number or boolean.
fn optional_scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TextScalar>::deserialize(deserializer)?.map(TextScalar::into_text))
}

/// Request to create a contact.
///
/// Missing required fields deserialize as empty strings and are rejected by
/// the store's required-field check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub email: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub phone: String,
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub address: Option<String>,
}

impl From<CreateContactRequest> for NewContact {
    fn from(req: CreateContactRequest) -> Self {
        NewContact {
            name: req.name,
            email: req.email,
            phone: req.phone,
            company: req.company,
            address: req.address,
        }
    }
}

/// Partial update of a contact. Unknown keys (such as lock fields echoed
/// back by a client) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub phone: Option<String>,
    /// Empty string clears the value
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub company: Option<String>,
    /// Empty string clears the value
    #[serde(default, deserialize_with = "optional_scalar_text")]
    pub address: Option<String>,
}

impl HasUpdates for UpdateContactRequest {
    fn has_any_updates(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.company.is_some()
            || self.address.is_some()
    }
}

impl From<UpdateContactRequest> for ContactPatch {
    fn from(req: UpdateContactRequest) -> Self {
        ContactPatch {
            name: req.name,
            email: req.email,
            phone: req.phone,
            company: req.company,
            address: req.address,
        }
    }
}

/// Query string of `GET /api/contacts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListContactsParams {
    /// 1-based page number (default 1)
    pub page: Option<u64>,
    /// Page size (default 10)
    pub limit: Option<u64>,
    /// Case-insensitive substring of name, email or phone
    pub search: Option<String>,
    /// Sort field, prefix with `-` for descending (default `name`)
    pub sort: Option<String>,
    /// JSON object of exact-match constraints, e.g. `{"company":"Acme"}`
    pub filter: Option<String>,
}

/// One page of contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListContactsResponse {
    pub contacts: Vec<Contact>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

/// Response of a single delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteContactResponse {
    pub message: String,
}

impl DeleteContactResponse {
    pub fn deleted() -> Self {
        Self {
            message: "Contact deleted successfully".to_string(),
        }
    }
}

/// Request to delete several contacts at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchDeleteRequest {
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResponse {
    pub deleted_count: u64,
}

/// Body of `start-edit` and `end-edit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditSessionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_request_ignores_lock_fields() {
        let req: UpdateContactRequest = serde_json::from_value(json!({
            "name": "Jane",
            "isEditing": true,
            "editingBy": "alice"
        }))
        .unwrap();
        assert_eq!(req.name.as_deref(), Some("Jane"));
        assert!(req.has_any_updates());
        assert!(!UpdateContactRequest::default().has_any_updates());
    }

    #[test]
    fn test_numeric_text_fields_are_cast_to_strings() {
        let req: CreateContactRequest = serde_json::from_value(json!({
            "name": "Jane",
            "email": "jane@example.com",
            "phone": 5551234567u64,
            "company": null
        }))
        .unwrap();
        assert_eq!(req.phone, "5551234567");
        assert!(req.company.is_none());

        let missing: CreateContactRequest = serde_json::from_value(json!({"name": null})).unwrap();
        assert_eq!(missing.name, "");

        let patch: UpdateContactRequest = serde_json::from_value(json!({"phone": 5559876543u64}))
            .unwrap();
        assert_eq!(patch.phone.as_deref(), Some("5559876543"));

        let nested = serde_json::from_value::<CreateContactRequest>(json!({"phone": {"n": 1}}));
        assert!(nested.is_err());
    }

    #[test]
    fn test_list_response_wire_shape() {
        let resp = ListContactsResponse {
            contacts: Vec::new(),
            total: 15,
            page: 2,
            total_pages: 2,
        };
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["total"], 15);
    }

    #[test]
    fn test_edit_session_request_reads_user_id() {
        let req: EditSessionRequest = serde_json::from_value(json!({"userId": "alice"})).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("alice"));
        let empty: EditSessionRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.user_id.is_none());
    }
}
