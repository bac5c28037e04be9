//! OpenAPI Specification for Rolodex API
//!
//! This module defines the OpenAPI document for the Rolodex REST API.
//! It uses utoipa to generate the OpenAPI specification from Rust types
//! and route annotations.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{HealthReport, ProbeStatus};
use crate::types::*;

// Import route modules for path references
use crate::routes::{contact, health, transfer};

use rolodex_core::{Contact, ContactField, ContactPatch, NewContact};

/// OpenAPI document for Rolodex API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rolodex API",
        version = "0.1.0",
        description = "Contact book with edit locking and spreadsheet import/export",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local Development")
    ),
    tags(
        (name = "Contacts", description = "Contact CRUD, listing and batch delete"),
        (name = "Edit Sessions", description = "Advisory per-contact edit locks"),
        (name = "Transfer", description = "Spreadsheet upload, error reports and export"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    paths(
        // === Contact Routes ===
        contact::list_contacts,
        contact::get_contact,
        contact::create_contact,
        contact::update_contact,
        contact::delete_contact,
        contact::batch_delete,

        // === Edit Session Routes ===
        contact::start_edit,
        contact::end_edit,

        // === Transfer Routes ===
        transfer::upload_contacts,
        transfer::upload_error_report,
        transfer::export_contacts,

        // === Health Routes ===
        health::ping,
        health::live,
        health::ready,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Contact Types ===
            Contact, ContactField, NewContact, ContactPatch,
            CreateContactRequest, UpdateContactRequest, ListContactsResponse,
            DeleteContactResponse, BatchDeleteRequest, BatchDeleteResponse,
            EditSessionRequest,

            // === Transfer Types ===
            UploadForm, RowData, RowError, CreationFailure, ValidationReport, ImportReport,

            // === Health Types ===
            HealthReport, ProbeStatus,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}
