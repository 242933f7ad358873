//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness + uptime
//! - `/readyz`  : readiness (503 when draining)
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serverinfo_core::metrics::{export_with_gauges, CONTENT_TYPE};

use crate::app_state::AppState;

pub const UPTIME_GAUGE: &str = "serverinfo_uptime_seconds";
pub const DRAINING_GAUGE: &str = "serverinfo_draining";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    tracing::debug!("health check called");
    Json(HealthResponse {
        status: "OK",
        uptime_seconds: state.clock().elapsed_seconds(),
    })
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let gauges = [
        (UPTIME_GAUGE, state.clock().elapsed_seconds()),
        (DRAINING_GAUGE, u64::from(state.is_draining())),
    ];
    let body = export_with_gauges(state.registry(), &gauges);

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}
