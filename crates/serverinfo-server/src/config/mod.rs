//! Server config loader (strict parsing + env overrides).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use serverinfo_core::error::{Result, ServerInfoError};

pub use schema::{AppSection, MetricsSection, ServerInfoConfig, ServerSection};

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "SERVERINFO_CONFIG";
/// Used when `SERVERINFO_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "serverinfo.yaml";

/// Load config for the running process.
///
/// A missing file falls back to defaults; `VERSION`, `ENVIRONMENT` and
/// `BUILD_NUMBER` from the environment override the `app` section.
pub fn load(path: &str) -> Result<ServerInfoConfig> {
    let mut cfg = match read_file(path)? {
        Some(s) => parse(&s)?,
        None => {
            tracing::info!(%path, "config file not found, using defaults");
            ServerInfoConfig::default()
        }
    };
    cfg.apply_env_overrides(|key| std::env::var(key).ok());
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<ServerInfoConfig> {
    let cfg = parse(s)?;
    cfg.validate()?;
    Ok(cfg)
}

/// `None` when the file does not exist.
fn read_file(path: &str) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ServerInfoError::Internal(format!(
            "read config failed ({path}): {e}"
        ))),
    }
}

fn parse(s: &str) -> Result<ServerInfoConfig> {
    serde_yaml::from_str(s)
        .map_err(|e| ServerInfoError::Configuration(format!("invalid yaml: {e}")))
}
