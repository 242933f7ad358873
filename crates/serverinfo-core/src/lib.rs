//! serverinfo core: request metrics registry, Prometheus text exporter, and
//! the process uptime clock.
//!
//! This crate carries no HTTP or runtime dependencies. The server crate owns a
//! [`metrics::Registry`] instance and hands it to the request interceptor and
//! to the `/metrics` handler; tests build their own registries.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! Fallible paths surface as `ServerInfoError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;
pub mod uptime;

/// Shared result type.
pub use error::{Result, ServerInfoError};
