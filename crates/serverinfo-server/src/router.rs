//! Axum router wiring.
//!
//! Every route, including the fallback, runs inside the request-tracking
//! middleware.

use axum::{middleware, routing::get, Router};

use crate::{api, app_state::AppState, obs, ops, pages};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home::home).post(pages::home::submit))
        .route("/health", get(ops::health))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .route("/api/info", get(api::info::api_info))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::middleware::track_requests,
        ))
        .with_state(state)
}
