use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::transfer::DEFAULT_CONCURRENCY;

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// Global configuration loaded from `~/.config/mpu/config.toml`.
/// Command-line flags take precedence over these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpuConfig {
    /// Maximum part uploads in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Region used when `--region` is not given (None = SDK region chain).
    #[serde(default)]
    pub default_region: Option<String>,
    /// Custom endpoint for S3-compatible stores (MinIO, Ceph, ...).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Use path-style addressing; usually required with `endpoint_url`.
    #[serde(default)]
    pub force_path_style: bool,
    /// Command run for `--shutdown yes`; None uses the platform default.
    #[serde(default)]
    pub shutdown_command: Option<Vec<String>>,
}

impl Default for MpuConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            default_region: None,
            endpoint_url: None,
            force_path_style: false,
            shutdown_command: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mpu")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MpuConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MpuConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MpuConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = MpuConfig::default();
        assert_eq!(cfg.concurrency, 10);
        assert!(cfg.default_region.is_none());
        assert!(cfg.endpoint_url.is_none());
        assert!(!cfg.force_path_style);
        assert!(cfg.shutdown_command.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MpuConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MpuConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.concurrency, cfg.concurrency);
        assert_eq!(parsed.force_path_style, cfg.force_path_style);
    }

    #[test]
    fn config_toml_empty_uses_defaults() {
        let cfg: MpuConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.concurrency, 10);
        assert!(cfg.endpoint_url.is_none());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            concurrency = 4
            default_region = "eu-central-1"
            endpoint_url = "http://localhost:9000"
            force_path_style = true
            shutdown_command = ["systemctl", "poweroff"]
        "#;
        let cfg: MpuConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.concurrency, 4);
        assert_eq!(cfg.default_region.as_deref(), Some("eu-central-1"));
        assert_eq!(cfg.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert!(cfg.force_path_style);
        assert_eq!(
            cfg.shutdown_command,
            Some(vec!["systemctl".to_string(), "poweroff".to_string()])
        );
    }
}
