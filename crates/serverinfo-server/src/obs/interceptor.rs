//! Request interceptor: one counter increment and one latency observation per
//! request, recorded together when the request ends.
//!
//! The middleware drives this through [`RequestGuard`], so the end hook runs
//! on every exit path. If the handler future is dropped (client went away,
//! panic unwinding) the guard's `Drop` records the request with no status.
//!
//! Metric failures never reach the request: they are logged and skipped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serverinfo_core::error::Result;
use serverinfo_core::metrics::{CounterHandle, HistogramHandle, Registry};

pub const REQUESTS_TOTAL: &str = "serverinfo_http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "serverinfo_http_request_duration_seconds";

/// Time source for request timing.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Per-request timing record, consumed by `on_request_end`.
#[derive(Debug)]
pub struct RequestSample {
    start: Instant,
    method: String,
    path: String,
}

impl RequestSample {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

pub struct RequestInterceptor {
    clock: Arc<dyn Clock>,
    requests: CounterHandle,
    latency: HistogramHandle,
    clock_skew_events: AtomicU64,
}

impl RequestInterceptor {
    /// Register the request families in `registry` and time with the system clock.
    pub fn new(registry: &Registry, latency_buckets: &[f64]) -> Result<Self> {
        Self::with_clock(registry, latency_buckets, Arc::new(SystemClock))
    }

    pub fn with_clock(
        registry: &Registry,
        latency_buckets: &[f64],
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let requests = registry.register_counter(
            REQUESTS_TOTAL,
            "Total HTTP requests by method and route.",
            &["method", "path"],
        )?;
        let latency = registry.register_histogram(
            REQUEST_DURATION_SECONDS,
            "HTTP request latency in seconds by route.",
            &["path"],
            latency_buckets,
        )?;
        Ok(Self {
            clock,
            requests,
            latency,
            clock_skew_events: AtomicU64::new(0),
        })
    }

    pub fn on_request_start(&self, method: &str, path: &str) -> RequestSample {
        RequestSample {
            start: self.clock.now(),
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    /// Record the finished request. `status` is `None` when the request was
    /// abandoned before a response existed. Returns the recorded latency.
    pub fn on_request_end(&self, sample: RequestSample, status: Option<u16>) -> Duration {
        let elapsed = match self.clock.now().checked_duration_since(sample.start) {
            Some(d) => d,
            None => {
                self.clock_skew_events.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    method = %sample.method,
                    path = %sample.path,
                    "request end precedes start, latency clamped to zero"
                );
                Duration::ZERO
            }
        };

        if let Err(e) = self.requests.inc(&[sample.method.as_str(), sample.path.as_str()]) {
            tracing::warn!(error = %e, code = e.code().as_str(), "request counter update skipped");
        }
        if let Err(e) = self.latency.observe(&[sample.path.as_str()], elapsed.as_secs_f64()) {
            tracing::warn!(error = %e, code = e.code().as_str(), "latency observation skipped");
        }

        match status {
            Some(status) => tracing::debug!(
                method = %sample.method,
                path = %sample.path,
                status,
                latency_ms = elapsed.as_secs_f64() * 1000.0,
                "request completed"
            ),
            None => tracing::debug!(
                method = %sample.method,
                path = %sample.path,
                latency_ms = elapsed.as_secs_f64() * 1000.0,
                "request aborted before response"
            ),
        }
        elapsed
    }

    /// Start a request whose end is guaranteed to be recorded exactly once.
    pub fn guard(self: &Arc<Self>, method: &str, path: &str) -> RequestGuard {
        RequestGuard {
            sample: Some(self.on_request_start(method, path)),
            interceptor: Arc::clone(self),
        }
    }

    /// Number of requests whose latency was clamped because the clock went backwards.
    pub fn clock_skew_events(&self) -> u64 {
        self.clock_skew_events.load(Ordering::Relaxed)
    }

    pub fn requests(&self) -> &CounterHandle {
        &self.requests
    }

    pub fn latency(&self) -> &HistogramHandle {
        &self.latency
    }
}

/// Scoped request timer; ends the request on `finish` or on drop.
pub struct RequestGuard {
    interceptor: Arc<RequestInterceptor>,
    sample: Option<RequestSample>,
}

impl RequestGuard {
    pub fn finish(mut self, status: u16) -> Duration {
        match self.sample.take() {
            Some(sample) => self.interceptor.on_request_end(sample, Some(status)),
            None => Duration::ZERO,
        }
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        if let Some(sample) = self.sample.take() {
            self.interceptor.on_request_end(sample, None);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ManualClock(Mutex<Instant>);

    impl ManualClock {
        fn set(&self, t: Instant) {
            *self.0.lock().unwrap() = t;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock().unwrap()
        }
    }

    const BUCKETS: [f64; 3] = [0.1, 0.5, 1.0];

    #[test]
    fn end_records_count_and_latency() {
        let reg = Registry::new();
        let base = Instant::now();
        let clock = Arc::new(ManualClock(Mutex::new(base)));
        let ic = RequestInterceptor::with_clock(&reg, &BUCKETS, clock.clone()).unwrap();

        let sample = ic.on_request_start("GET", "/");
        clock.set(base + Duration::from_millis(300));
        let elapsed = ic.on_request_end(sample, Some(200));

        assert_eq!(elapsed, Duration::from_millis(300));
        assert_eq!(ic.requests().get(&["GET", "/"]), Some(1));
        let hist = ic.latency().get(&["/"]).unwrap();
        assert_eq!(hist.count, 1);
        assert_eq!(hist.buckets, vec![(0.1, 0), (0.5, 1), (1.0, 1)]);
    }

    #[test]
    fn clock_skew_is_clamped_not_propagated() {
        let reg = Registry::new();
        let base = Instant::now();
        let clock = Arc::new(ManualClock(Mutex::new(base + Duration::from_secs(5))));
        let ic = RequestInterceptor::with_clock(&reg, &BUCKETS, clock.clone()).unwrap();

        let sample = ic.on_request_start("GET", "/");
        clock.set(base);
        let elapsed = ic.on_request_end(sample, Some(200));

        assert_eq!(elapsed, Duration::ZERO);
        assert_eq!(ic.clock_skew_events(), 1);
        assert_eq!(ic.requests().get(&["GET", "/"]), Some(1));
        let hist = ic.latency().get(&["/"]).unwrap();
        assert_eq!(hist.count, 1);
        assert_eq!(hist.sum, 0.0);
        assert_eq!(hist.buckets[0].1, 1);
    }

    #[test]
    fn guard_records_once_on_finish() {
        let reg = Registry::new();
        let ic = Arc::new(RequestInterceptor::new(&reg, &BUCKETS).unwrap());
        ic.guard("POST", "/").finish(201);
        assert_eq!(ic.requests().get(&["POST", "/"]), Some(1));
        assert_eq!(ic.latency().get(&["/"]).unwrap().count, 1);
    }

    #[test]
    fn guard_records_on_drop() {
        let reg = Registry::new();
        let ic = Arc::new(RequestInterceptor::new(&reg, &BUCKETS).unwrap());
        {
            let _guard = ic.guard("GET", "/slow");
        }
        assert_eq!(ic.requests().get(&["GET", "/slow"]), Some(1));
    }

    #[test]
    fn guard_records_on_panic_unwind() {
        let reg = Registry::new();
        let ic = Arc::new(RequestInterceptor::new(&reg, &BUCKETS).unwrap());
        let ic2 = Arc::clone(&ic);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = ic2.guard("GET", "/boom");
            panic!("handler failed");
        }));
        assert!(res.is_err());
        assert_eq!(ic.requests().get(&["GET", "/boom"]), Some(1));
        assert_eq!(ic.latency().get(&["/boom"]).unwrap().count, 1);
    }

    #[test]
    fn sharing_a_registry_reuses_families() {
        let reg = Registry::new();
        let a = RequestInterceptor::new(&reg, &BUCKETS).unwrap();
        let b = RequestInterceptor::new(&reg, &BUCKETS).unwrap();
        a.on_request_end(a.on_request_start("GET", "/"), Some(200));
        b.on_request_end(b.on_request_start("GET", "/"), Some(200));
        assert_eq!(a.requests().get(&["GET", "/"]), Some(2));

        // different bounds under the same name cannot be registered
        assert!(RequestInterceptor::new(&reg, &[1.0]).is_err());
    }
}
