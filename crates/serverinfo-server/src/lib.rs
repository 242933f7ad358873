//! serverinfo server library entry.
//!
//! Wires config, host identity, the request interceptor and the HTTP
//! handlers into one axum router. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod host;
pub mod obs;
pub mod ops;
pub mod pages;
pub mod router;
