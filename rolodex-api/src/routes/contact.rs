//! Contact REST API Routes
//!
//! CRUD, listing, batch delete and edit sessions under `/api/contacts`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rolodex_core::Contact;
use rolodex_storage::SharedStore;

use crate::{
    error::{ApiError, ApiResult},
    extractors::PathId,
    services::{self, ContactQuery},
    state::AppState,
    types::{
        BatchDeleteRequest, BatchDeleteResponse, CreateContactRequest, DeleteContactResponse,
        EditSessionRequest, ListContactsParams, ListContactsResponse, UpdateContactRequest,
    },
    validation::{HasUpdates, ValidateNonEmpty},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/contacts - List contacts with search, filter, sort and paging
#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    params(ListContactsParams),
    responses(
        (status = 200, description = "One page of contacts", body = ListContactsResponse),
        (status = 400, description = "Invalid query", body = ApiError),
    ),
)]
pub async fn list_contacts(
    State(store): State<SharedStore>,
    params: Result<Query<ListContactsParams>, QueryRejection>,
) -> ApiResult<Json<ListContactsResponse>> {
    let Query(params) = params?;
    let query = ContactQuery::from_params(&params)?;
    let page = services::list_contacts(store.as_ref(), &query).await?;
    Ok(Json(page))
}

/// GET /api/contacts/{id} - Get a contact by ID
#[utoipa::path(
    get,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = String, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact details", body = Contact),
        (status = 400, description = "Malformed ID", body = ApiError),
        (status = 404, description = "Contact not found", body = ApiError),
    ),
)]
pub async fn get_contact(
    State(store): State<SharedStore>,
    PathId(id): PathId,
) -> ApiResult<Json<Contact>> {
    let contact = store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::contact_not_found(id))?;
    Ok(Json(contact))
}

/// POST /api/contacts - Create a contact
#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "Contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = Contact),
        (status = 400, description = "Missing field or duplicate email/phone", body = ApiError),
    ),
)]
pub async fn create_contact(
    State(store): State<SharedStore>,
    body: Result<Json<CreateContactRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = body?;
    let contact = store.insert(req.into()).await?;
    tracing::info!(id = %contact.id, "Contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

/// PUT /api/contacts/{id} - Update a contact
#[utoipa::path(
    put,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = String, Path, description = "Contact ID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contact updated", body = Contact),
        (status = 400, description = "Invalid update or duplicate email/phone", body = ApiError),
        (status = 404, description = "Contact not found", body = ApiError),
    ),
)]
pub async fn update_contact(
    State(store): State<SharedStore>,
    PathId(id): PathId,
    body: Result<Json<UpdateContactRequest>, JsonRejection>,
) -> ApiResult<Json<Contact>> {
    let Json(req) = body?;
    req.validate_has_updates()?;

    let contact = store
        .update(id, req.into())
        .await?
        .ok_or_else(|| ApiError::contact_not_found(id))?;
    tracing::info!(%id, "Contact updated");
    Ok(Json(contact))
}

/// DELETE /api/contacts/{id} - Delete a contact
#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    tag = "Contacts",
    params(("id" = String, Path, description = "Contact ID")),
    responses(
        (status = 200, description = "Contact deleted", body = DeleteContactResponse),
        (status = 404, description = "Contact not found", body = ApiError),
    ),
)]
pub async fn delete_contact(
    State(store): State<SharedStore>,
    PathId(id): PathId,
) -> ApiResult<Json<DeleteContactResponse>> {
    store
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::contact_not_found(id))?;
    tracing::info!(%id, "Contact deleted");
    Ok(Json(DeleteContactResponse::deleted()))
}

/// POST /api/contacts/batch-delete - Delete several contacts
#[utoipa::path(
    post,
    path = "/api/contacts/batch-delete",
    tag = "Contacts",
    request_body = BatchDeleteRequest,
    responses(
        (status = 200, description = "Number of contacts deleted", body = BatchDeleteResponse),
        (status = 400, description = "Missing or empty ID list", body = ApiError),
    ),
)]
pub async fn batch_delete(
    State(store): State<SharedStore>,
    body: Result<Json<BatchDeleteRequest>, JsonRejection>,
) -> ApiResult<Json<BatchDeleteResponse>> {
    let ids = body
        .ok()
        .and_then(|Json(req)| req.ids)
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| ApiError::invalid_input("Please provide an array of IDs"))?;
    let ids = services::parse_ids(&ids)?;

    let deleted_count = store.delete_many(&ids).await?;
    tracing::info!(requested = ids.len(), deleted_count, "Batch delete");
    Ok(Json(BatchDeleteResponse { deleted_count }))
}

/// POST /api/contacts/{id}/start-edit - Acquire the edit lock
#[utoipa::path(
    post,
    path = "/api/contacts/{id}/start-edit",
    tag = "Edit Sessions",
    params(("id" = String, Path, description = "Contact ID")),
    request_body = EditSessionRequest,
    responses(
        (status = 200, description = "Lock acquired or extended", body = Contact),
        (status = 400, description = "userId missing", body = ApiError),
        (status = 404, description = "Contact not found", body = ApiError),
        (status = 409, description = "Locked by another user", body = ApiError),
    ),
)]
pub async fn start_edit(
    State(store): State<SharedStore>,
    PathId(id): PathId,
    body: Option<Json<EditSessionRequest>>,
) -> ApiResult<Json<Contact>> {
    let user_id = session_owner(body)?;
    let contact = services::acquire_edit_lock(store.as_ref(), id, &user_id).await?;
    Ok(Json(contact))
}

/// POST /api/contacts/{id}/end-edit - Release the edit lock
#[utoipa::path(
    post,
    path = "/api/contacts/{id}/end-edit",
    tag = "Edit Sessions",
    params(("id" = String, Path, description = "Contact ID")),
    request_body = EditSessionRequest,
    responses(
        (status = 200, description = "Lock released, or unchanged if held by someone else", body = Contact),
        (status = 400, description = "userId missing", body = ApiError),
        (status = 404, description = "Contact not found", body = ApiError),
    ),
)]
pub async fn end_edit(
    State(store): State<SharedStore>,
    PathId(id): PathId,
    body: Option<Json<EditSessionRequest>>,
) -> ApiResult<Json<Contact>> {
    let user_id = session_owner(body)?;
    let contact = services::release_edit_lock(store.as_ref(), id, &user_id).await?;
    Ok(Json(contact))
}

/// A missing or unparseable body reads as a missing `userId`.
fn session_owner(body: Option<Json<EditSessionRequest>>) -> ApiResult<String> {
    let user_id = body.and_then(|Json(req)| req.user_id);
    user_id.validate_non_empty("userId")?;
    Ok(user_id.unwrap_or_default())
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the contact router. Mounted at `/api/contacts`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contacts).post(create_contact))
        .route("/batch-delete", post(batch_delete))
        .route(
            "/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route("/:id/start-edit", post(start_edit))
        .route("/:id/end-edit", post(end_edit))
}
