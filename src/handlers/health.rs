use std::sync::OnceLock;
use std::time::Instant;

use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

static STARTED: OnceLock<Instant> = OnceLock::new();

/// Records the service start time; called once during router assembly.
pub(crate) fn mark_started() {
    STARTED.get_or_init(Instant::now);
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: STARTED.get().map(|s| s.elapsed().as_secs()).unwrap_or(0),
    })
}
