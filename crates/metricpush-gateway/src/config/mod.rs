//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use metricpush_core::error::{MetricPushError, Result};

pub use schema::{GatewayConfig, GatewaySection, StreamSection};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "METRICPUSH_CONFIG";
/// Config file looked up in the working directory when `CONFIG_ENV` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "metricpush.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricPushError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricPushError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve config from the environment.
///
/// An explicitly named file must exist. The default file is optional; when it
/// is absent the built-in defaults apply.
pub fn load() -> Result<GatewayConfig> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return load_from_file(&path);
    }
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        return load_from_file(DEFAULT_CONFIG_PATH);
    }
    tracing::info!("no {DEFAULT_CONFIG_PATH} found, using built-in defaults");
    Ok(GatewayConfig::default())
}
