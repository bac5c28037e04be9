//! REST API Routes
//!
//! Route modules and router assembly:
//! - `/api/contacts` - contact CRUD, edit sessions, spreadsheet transfer
//! - `/health` - liveness and readiness probes
//! - `/openapi.json` - OpenAPI document

pub mod contact;
pub mod health;
pub mod transfer;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub use contact::create_router as contact_router;
pub use health::create_router as health_router;
pub use transfer::create_router as transfer_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for serving the OpenAPI JSON specification.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// CORS CONFIGURATION
// ============================================================================

/// Build CORS layer from API configuration.
///
/// An empty origin list allows any origin without credentials. Otherwise
/// origins are matched with `ApiConfig::is_origin_allowed`, which also
/// understands `*.example.com` entries.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if !config.is_restricted() {
        tracing::info!("CORS: allowing all origins");
        return cors.allow_origin(Any);
    }

    tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
    let allowed = config.clone();
    let cors = cors.allow_origin(AllowOrigin::predicate(
        move |origin: &HeaderValue, _parts| {
            origin
                .to_str()
                .map(|o| allowed.is_origin_allowed(o))
                .unwrap_or(false)
        },
    ));

    if config.cors_allow_credentials {
        cors.allow_credentials(true)
    } else {
        cors
    }
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Create the complete API router.
pub fn create_api_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let contacts = contact::create_router().merge(transfer::create_router());

    Router::new()
        .nest("/api/contacts", contacts)
        .nest("/health", health::create_router())
        .route("/openapi.json", get(openapi_json))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
