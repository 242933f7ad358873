//! JSON API endpoints.

pub mod info;
