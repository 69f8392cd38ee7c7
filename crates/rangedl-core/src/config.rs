//! Transfer configuration.
//!
//! The engine itself never reads a config file; callers build a
//! `TransferConfig` directly or load one from an explicit TOML path.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::downloader::CurlOptions;

/// How segments are reassembled into the destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Each segment writes straight into its offset of the shared destination file.
    #[default]
    Direct,
    /// Each segment writes its own `.partN` file; parts are concatenated after the join.
    Merge,
}

/// Parameters for one segmented download.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Number of byte ranges and size of the worker pool.
    pub concurrency: usize,
    /// Reassembly strategy.
    pub strategy: Strategy,
    /// libcurl receive buffer size in bytes (None = library default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_bytes: Option<usize>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a transfer that stays below this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            strategy: Strategy::Direct,
            buffer_bytes: None,
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
        }
    }
}

impl TransferConfig {
    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        if self.buffer_bytes == Some(0) {
            anyhow::bail!("buffer_bytes must be positive when set");
        }
        Ok(())
    }

    /// Transport-level options shared by the prober and every segment fetcher.
    pub fn curl_options(&self) -> CurlOptions {
        CurlOptions {
            buffer_size: self.buffer_bytes,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
        }
    }
}

/// Load and validate a config from a TOML file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<TransferConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: TransferConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!("loaded config from {}: {:?}", path.display(), cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = TransferConfig::default();
        assert_eq!(cfg.concurrency, 8);
        assert_eq!(cfg.strategy, Strategy::Direct);
        assert!(cfg.buffer_bytes.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = TransferConfig {
            concurrency: 3,
            strategy: Strategy::Merge,
            buffer_bytes: Some(16 * 1024),
            ..TransferConfig::default()
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: TransferConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.concurrency, 3);
        assert_eq!(parsed.strategy, Strategy::Merge);
        assert_eq!(parsed.buffer_bytes, Some(16 * 1024));
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let cfg: TransferConfig = toml::from_str(r#"strategy = "merge""#).unwrap();
        assert_eq!(cfg.strategy, Strategy::Merge);
        assert_eq!(cfg.concurrency, 8);
        assert_eq!(cfg.connect_timeout_secs, 30);
    }

    #[test]
    fn zero_concurrency_rejected() {
        let cfg = TransferConfig {
            concurrency: 0,
            ..TransferConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rangedl.toml");
        fs::write(&path, "concurrency = 4\nlow_speed_time_secs = 10\n").unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.concurrency, 4);
        assert_eq!(cfg.curl_options().low_speed_time, Duration::from_secs(10));
    }

    #[test]
    fn load_from_path_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "concurrency = 0\n").unwrap();
        assert!(load_from_path(&path).is_err());
    }
}
