//! `/health` probes. Readiness pings the contact store.

use std::time::Instant;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use rolodex_storage::SharedStore;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

/// Body of `/health/live` and `/health/ready`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: ProbeStatus,
    pub version: String,
    pub uptime_seconds: u64,
    /// Round trip of the store ping (readiness only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
}

impl HealthReport {
    fn healthy(started: Instant) -> Self {
        Self {
            status: ProbeStatus::Healthy,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: started.elapsed().as_secs(),
            store_latency_ms: None,
            store_error: None,
        }
    }
}

/// GET /health/ping
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses((status = 200, description = "Always `pong`", body = String)),
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live - The process is serving requests
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, description = "Process is alive", body = HealthReport)),
)]
pub async fn live(State(started): State<Instant>) -> Json<HealthReport> {
    Json(HealthReport::healthy(started))
}

/// GET /health/ready - The contact store answers a ping
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Store reachable", body = HealthReport),
        (status = 503, description = "Store unreachable", body = HealthReport),
    ),
)]
pub async fn ready(
    State(store): State<SharedStore>,
    State(started): State<Instant>,
) -> (StatusCode, Json<HealthReport>) {
    let mut report = HealthReport::healthy(started);
    let pinged_at = Instant::now();

    match store.ping().await {
        Ok(()) => {
            report.store_latency_ms = Some(pinged_at.elapsed().as_millis() as u64);
            (StatusCode::OK, Json(report))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            report.status = ProbeStatus::Unhealthy;
            report.store_error = Some(e.to_string());
            (StatusCode::SERVICE_UNAVAILABLE, Json(report))
        }
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(live))
        .route("/ready", get(ready))
}
