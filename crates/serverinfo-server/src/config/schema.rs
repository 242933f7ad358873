use std::net::SocketAddr;

use serde::Deserialize;
use serverinfo_core::error::{Result, ServerInfoError};
use serverinfo_core::metrics::validate_bounds;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerInfoConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub app: AppSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for ServerInfoConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            app: AppSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl ServerInfoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ServerInfoError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.app.validate()?;
        self.metrics.validate()?;
        Ok(())
    }

    /// Overlay `VERSION`, `ENVIRONMENT` and `BUILD_NUMBER` onto `app`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("VERSION") {
            self.app.version = v;
        }
        if let Some(v) = lookup("ENVIRONMENT") {
            self.app.environment = v;
        }
        if let Some(v) = lookup("BUILD_NUMBER") {
            self.app.build_number = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ServerInfoError::Configuration(format!(
                "server.listen must be a valid socket address ({}): {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:5002".into()
}

/// Identity labels shown on the page and in `/api/info`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    #[serde(default = "default_app_version")]
    pub version: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_build_number")]
    pub build_number: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: default_app_version(),
            environment: default_environment(),
            build_number: default_build_number(),
        }
    }
}

impl AppSection {
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("app.version", &self.version),
            ("app.environment", &self.environment),
            ("app.build_number", &self.build_number),
        ] {
            if value.trim().is_empty() {
                return Err(ServerInfoError::Configuration(format!(
                    "{key} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

fn default_app_version() -> String {
    "1.0".into()
}
fn default_environment() -> String {
    "DEV".into()
}
fn default_build_number() -> String {
    "local".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Latency histogram bounds in seconds.
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            latency_buckets: default_latency_buckets(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_bounds(&self.latency_buckets).map_err(|e| {
            ServerInfoError::Configuration(format!("metrics.latency_buckets: {e}"))
        })
    }
}

fn default_latency_buckets() -> Vec<f64> {
    vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
}
