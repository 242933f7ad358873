//! Shared application state for the serverinfo server.
//!
//! The state owns the metrics registry and hands it to the request
//! interceptor and the `/metrics` handler. Nothing here is global, so tests
//! can build as many isolated states as they like.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serverinfo_core::error::Result;
use serverinfo_core::metrics::Registry;
use serverinfo_core::uptime::ProcessClock;

use crate::config::ServerInfoConfig;
use crate::host::HostIdentity;
use crate::obs::RequestInterceptor;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    registry: Arc<Registry>,
    interceptor: Arc<RequestInterceptor>,
}

struct AppStateInner {
    cfg: ServerInfoConfig,
    host: HostIdentity,
    clock: ProcessClock,
    draining: AtomicBool,
}

impl AppState {
    /// Build application state and register the request metric families.
    pub fn new(cfg: ServerInfoConfig, host: HostIdentity) -> Result<Self> {
        let registry = Arc::new(Registry::new());
        let interceptor = RequestInterceptor::new(&registry, &cfg.metrics.latency_buckets)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                host,
                clock: ProcessClock::start(),
                draining: AtomicBool::new(false),
            }),
            registry,
            interceptor: Arc::new(interceptor),
        })
    }

    pub fn cfg(&self) -> &ServerInfoConfig {
        &self.inner.cfg
    }

    pub fn host(&self) -> &HostIdentity {
        &self.inner.host
    }

    pub fn clock(&self) -> &ProcessClock {
        &self.inner.clock
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn interceptor(&self) -> Arc<RequestInterceptor> {
        Arc::clone(&self.interceptor)
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
