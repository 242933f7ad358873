//! `GET /api/info`: host identity and environment labels.

use axum::{extract::State, Json};
use chrono::DateTime;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub hostname: String,
    pub ip_address: String,
    pub version: String,
    pub environment: String,
    pub build_number: String,
    /// RFC 3339, UTC.
    pub started_at: String,
    pub uptime_seconds: u64,
}

pub async fn api_info(State(state): State<AppState>) -> Json<InfoResponse> {
    tracing::debug!("api info endpoint called");

    let host = state.host();
    let app = &state.cfg().app;
    let clock = state.clock();
    let started_at = i64::try_from(clock.started_at_unix())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    Json(InfoResponse {
        hostname: host.hostname.clone(),
        ip_address: host.ip_address.clone(),
        version: app.version.clone(),
        environment: app.environment.clone(),
        build_number: app.build_number.clone(),
        started_at,
        uptime_seconds: clock.elapsed_seconds(),
    })
}
