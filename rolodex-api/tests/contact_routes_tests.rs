//! Router-level tests for contact CRUD, listing, batch delete and edit
//! sessions, driven through the full Axum router over an in-memory store.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

#[path = "support/app.rs"]
mod app_support;
use app_support::*;

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
async fn test_create_get_update_delete_cycle() {
    let (app, _) = test_app();

    let created = send_json(
        &app,
        Method::POST,
        "/api/contacts",
        json!({
            "name": "  Jane Doe ",
            "email": "Jane@Example.com",
            "phone": "555-123-4567",
            "company": "Acme",
        }),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let contact = created.json();
    assert_eq!(contact["name"], "Jane Doe");
    assert_eq!(contact["email"], "jane@example.com");
    assert_eq!(contact["isEditing"], false);
    assert!(contact["editingBy"].is_null());
    let id = contact["id"].as_str().unwrap().to_string();

    let fetched = get(&app, &format!("/api/contacts/{}", id)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["company"], "Acme");

    let updated = send_json(
        &app,
        Method::PUT,
        &format!("/api/contacts/{}", id),
        json!({ "company": "Globex" }),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["company"], "Globex");
    assert_eq!(updated.json()["name"], "Jane Doe");

    let deleted = delete(&app, &format!("/api/contacts/{}", id)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["message"], "Contact deleted successfully");

    let gone = get(&app, &format!("/api/contacts/{}", id)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_name_email_phone() {
    let (app, memory) = test_app();

    let response = send_json(
        &app,
        Method::POST,
        "/api/contacts",
        json!({ "name": "Jane", "email": "   ", "phone": "5551234567" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["error"].as_str().unwrap().contains("email"));
    assert_eq!(memory.len().unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejects_duplicate_email_and_phone() {
    let (app, memory) = test_app();
    create(&app, "Jane", "jane@example.com", "5551234567").await;

    let same_email = send_json(
        &app,
        Method::POST,
        "/api/contacts",
        json!({ "name": "Other", "email": "JANE@example.com", "phone": "5550000000" }),
    )
    .await;
    assert_eq!(same_email.status, StatusCode::BAD_REQUEST);

    let same_phone = send_json(
        &app,
        Method::POST,
        "/api/contacts",
        json!({ "name": "Other", "email": "other@example.com", "phone": "5551234567" }),
    )
    .await;
    assert_eq!(same_phone.status, StatusCode::BAD_REQUEST);
    assert_eq!(memory.len().unwrap(), 1);
}

#[tokio::test]
async fn test_update_into_existing_email_is_rejected() {
    let (app, _) = test_app();
    create(&app, "Jane", "jane@example.com", "5551234567").await;
    let john = create(&app, "John", "john@example.com", "5559876543").await;

    let response = send_json(
        &app,
        Method::PUT,
        &format!("/api/contacts/{}", john["id"].as_str().unwrap()),
        json!({ "email": "jane@example.com" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_with_empty_body_is_rejected() {
    let (app, _) = test_app();
    let jane = create(&app, "Jane", "jane@example.com", "5551234567").await;

    let response = send_json(
        &app,
        Method::PUT,
        &format!("/api/contacts/{}", jane["id"].as_str().unwrap()),
        json!({}),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let (app, _) = test_app();

    let missing = get(&app, "/api/contacts/01890a5d-ac96-774b-bcce-b302099a8057").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["code"], "CONTACT_NOT_FOUND");

    let update_missing = send_json(
        &app,
        Method::PUT,
        "/api/contacts/01890a5d-ac96-774b-bcce-b302099a8057",
        json!({ "name": "Nobody" }),
    )
    .await;
    assert_eq!(update_missing.status, StatusCode::NOT_FOUND);

    let delete_missing = delete(&app, "/api/contacts/01890a5d-ac96-774b-bcce-b302099a8057").await;
    assert_eq!(delete_missing.status, StatusCode::NOT_FOUND);

    let malformed = get(&app, "/api/contacts/not-a-uuid").await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// LISTING
// ============================================================================

#[tokio::test]
async fn test_list_defaults_and_pagination() {
    let (app, _) = test_app();
    for i in 0..12 {
        create(
            &app,
            &format!("Person {:02}", i),
            &format!("p{}@example.com", i),
            &format!("55500000{:02}", i),
        )
        .await;
    }

    let first = get(&app, "/api/contacts").await;
    assert_eq!(first.status, StatusCode::OK);
    let body = first.json();
    assert_eq!(body["total"], 12);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["contacts"].as_array().unwrap().len(), 10);

    let second = get(&app, "/api/contacts?page=2&limit=10").await.json();
    assert_eq!(second["contacts"].as_array().unwrap().len(), 2);

    let beyond = get(&app, "/api/contacts?page=5").await.json();
    assert!(beyond["contacts"].as_array().unwrap().is_empty());
    assert_eq!(beyond["total"], 12);
}

#[tokio::test]
async fn test_list_search_filter_and_sort() {
    let (app, _) = test_app();
    create(&app, "Jane Doe", "jane@acme.com", "5551234567").await;
    create(&app, "John Smith", "john@globex.com", "5559876543").await;
    create(&app, "Alice Brown", "alice@acme.com", "5550001111").await;

    let search = get(&app, "/api/contacts?search=ACME").await.json();
    assert_eq!(search["total"], 2);

    let sorted = get(&app, "/api/contacts?sort=name").await.json();
    let names: Vec<&str> = sorted["contacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice Brown", "Jane Doe", "John Smith"]);

    let descending = get(&app, "/api/contacts?sort=-name").await.json();
    assert_eq!(descending["contacts"][0]["name"], "John Smith");

    let filter = urlencode(r#"{"email":"john@globex.com"}"#);
    let filtered = get(&app, &format!("/api/contacts?filter={}", filter)).await.json();
    assert_eq!(filtered["total"], 1);
    assert_eq!(filtered["contacts"][0]["name"], "John Smith");
}

#[tokio::test]
async fn test_list_rejects_bad_query() {
    let (app, _) = test_app();

    assert_eq!(
        get(&app, "/api/contacts?sort=shoeSize").await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        get(&app, "/api/contacts?filter=notjson").await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        get(&app, "/api/contacts?page=0").await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        get(&app, "/api/contacts?limit=5000").await.status,
        StatusCode::BAD_REQUEST
    );

    let not_a_number = get(&app, "/api/contacts?page=abc").await;
    assert_eq!(not_a_number.status, StatusCode::BAD_REQUEST);
    assert_eq!(not_a_number.json()["code"], "INVALID_INPUT");
    assert!(not_a_number.json()["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid query string"));
}

#[tokio::test]
async fn test_create_accepts_numeric_phone() {
    let (app, _) = test_app();
    let response = send_json(
        &app,
        Method::POST,
        "/api/contacts",
        json!({ "name": "Jane Doe", "email": "jane@example.com", "phone": 5551234567u64 }),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["phone"], "5551234567");

    let id = response.json()["id"].as_str().unwrap().to_string();
    let updated = send_json(
        &app,
        Method::PUT,
        &format!("/api/contacts/{}", id),
        json!({ "phone": 5559876543u64 }),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["phone"], "5559876543");
}

#[tokio::test]
async fn test_unusable_bodies_get_json_errors() {
    let (app, memory) = test_app();

    let raw = |method: Method, uri: &str, content_type: Option<&str>, body: &str| {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    };

    let malformed = send(
        &app,
        raw(Method::POST, "/api/contacts", Some("application/json"), "{oops"),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.json()["code"], "INVALID_INPUT");

    let untyped = send(
        &app,
        raw(
            Method::POST,
            "/api/contacts",
            None,
            r#"{"name":"Jane","email":"jane@example.com","phone":"5551234567"}"#,
        ),
    )
    .await;
    assert_eq!(untyped.status, StatusCode::BAD_REQUEST);
    assert_eq!(untyped.json()["code"], "INVALID_INPUT");

    let wrong_shape = send_json(
        &app,
        Method::POST,
        "/api/contacts",
        json!({ "name": ["Jane"], "email": "jane@example.com", "phone": "5551234567" }),
    )
    .await;
    assert_eq!(wrong_shape.status, StatusCode::BAD_REQUEST);
    assert!(wrong_shape.json()["error"].is_string());
    assert_eq!(memory.len().unwrap(), 0);

    let jane = create(&app, "Jane Doe", "jane@example.com", "5551234567").await;
    let uri = format!("/api/contacts/{}", jane["id"].as_str().unwrap());
    let bad_update = send(&app, raw(Method::PUT, &uri, Some("application/json"), "[1,2"))
        .await;
    assert_eq!(bad_update.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_update.json()["code"], "INVALID_INPUT");
}

// ============================================================================
// BATCH DELETE
// ============================================================================

#[tokio::test]
async fn test_batch_delete_counts_only_existing() {
    let (app, memory) = test_app();
    let jane = create(&app, "Jane", "jane@example.com", "5551234567").await;
    let john = create(&app, "John", "john@example.com", "5559876543").await;
    create(&app, "Alice", "alice@example.com", "5550001111").await;

    let response = send_json(
        &app,
        Method::POST,
        "/api/contacts/batch-delete",
        json!({ "ids": [
            jane["id"],
            john["id"],
            "01890a5d-ac96-774b-bcce-b302099a8057",
        ]}),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["deletedCount"], 2);
    assert_eq!(memory.len().unwrap(), 1);
}

#[tokio::test]
async fn test_batch_delete_requires_ids() {
    let (app, _) = test_app();

    for body in [json!({}), json!({ "ids": [] }), json!({ "ids": "abc" })] {
        let response = send_json(&app, Method::POST, "/api/contacts/batch-delete", body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json()["error"], "Please provide an array of IDs");
    }
}

// ============================================================================
// EDIT SESSIONS
// ============================================================================

#[tokio::test]
async fn test_edit_lock_lifecycle() {
    let (app, _) = test_app();
    let jane = create(&app, "Jane", "jane@example.com", "5551234567").await;
    let id = jane["id"].as_str().unwrap();
    let start = format!("/api/contacts/{}/start-edit", id);
    let end = format!("/api/contacts/{}/end-edit", id);

    let locked = send_json(&app, Method::POST, &start, json!({ "userId": "alice" })).await;
    assert_eq!(locked.status, StatusCode::OK);
    assert_eq!(locked.json()["isEditing"], true);
    assert_eq!(locked.json()["editingBy"], "alice");

    // Re-entrant for the holder
    let again = send_json(&app, Method::POST, &start, json!({ "userId": "alice" })).await;
    assert_eq!(again.status, StatusCode::OK);

    let conflict = send_json(&app, Method::POST, &start, json!({ "userId": "bob" })).await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);
    assert_eq!(
        conflict.json()["error"],
        "Contact is being edited by another user"
    );

    // Non-holder release leaves the lock in place
    let not_holder = send_json(&app, Method::POST, &end, json!({ "userId": "bob" })).await;
    assert_eq!(not_holder.status, StatusCode::OK);
    assert_eq!(not_holder.json()["editingBy"], "alice");

    let released = send_json(&app, Method::POST, &end, json!({ "userId": "alice" })).await;
    assert_eq!(released.status, StatusCode::OK);
    assert_eq!(released.json()["isEditing"], false);
    assert!(released.json()["editingUntil"].is_null());

    let bob = send_json(&app, Method::POST, &start, json!({ "userId": "bob" })).await;
    assert_eq!(bob.status, StatusCode::OK);
}

#[tokio::test]
async fn test_edit_session_requires_user_id() {
    let (app, _) = test_app();
    let jane = create(&app, "Jane", "jane@example.com", "5551234567").await;
    let start = format!("/api/contacts/{}/start-edit", jane["id"].as_str().unwrap());

    let response = send_json(&app, Method::POST, &start, json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "userId is required");

    let missing = send_json(
        &app,
        Method::POST,
        "/api/contacts/01890a5d-ac96-774b-bcce-b302099a8057/start-edit",
        json!({ "userId": "alice" }),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// HEALTH
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = test_app();

    let ping = get(&app, "/health/ping").await;
    assert_eq!(ping.status, StatusCode::OK);
    assert_eq!(ping.body, b"pong");

    let ready = get(&app, "/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
    assert_eq!(ready.json()["status"], "healthy");
}

fn urlencode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}
