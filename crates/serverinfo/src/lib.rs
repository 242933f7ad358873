//! Top-level facade crate for serverinfo.
//!
//! Re-exports the metrics core and the HTTP server library so users can depend on a single crate.

pub mod core {
    pub use serverinfo_core::*;
}

pub mod server {
    pub use serverinfo_server::*;
}
