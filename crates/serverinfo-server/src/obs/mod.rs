//! Request observability.
//!
//! `interceptor` owns the request families and the start/end hooks;
//! `middleware` plugs them into the axum stack and logs every request.

pub mod interceptor;
pub mod middleware;

pub use interceptor::{Clock, RequestGuard, RequestInterceptor, RequestSample, SystemClock};
