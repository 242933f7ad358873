//! Host identity shown on the page and in `/api/info`.

use std::net::SocketAddr;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone)]
pub struct HostIdentity {
    pub hostname: String,
    pub ip_address: String,
}

impl HostIdentity {
    /// Resolve the local hostname and its address once at startup.
    pub async fn resolve() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| UNKNOWN.into());

        let ip_address = match tokio::net::lookup_host((hostname.as_str(), 0)).await {
            Ok(addrs) => {
                let addrs: Vec<SocketAddr> = addrs.collect();
                addrs
                    .iter()
                    .find(|a| a.is_ipv4())
                    .or_else(|| addrs.first())
                    .map(|a| a.ip().to_string())
                    .unwrap_or_else(|| UNKNOWN.into())
            }
            Err(e) => {
                tracing::warn!(%hostname, error = %e, "hostname lookup failed");
                UNKNOWN.into()
            }
        };

        Self {
            hostname,
            ip_address,
        }
    }

    pub fn fixed(hostname: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ip_address: ip_address.into(),
        }
    }
}
