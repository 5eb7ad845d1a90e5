//! # Configuration Module
//!
//! Optional TOML configuration shared by the lab binaries. Every field has a
//! default, so an absent file or an absent section yields the classroom
//! setup. Command-line flags override individual fields after loading.
//!
//! ```toml
//! [signal]
//! samples = 500
//!
//! [dashboard]
//! data_dir = "data"
//!
//! [regression]
//! slope = 2.5
//! intercept = 1.0
//!
//! [web]
//! bind = "127.0.0.1:5006"
//! ```

use crate::regression::{LineFit, LineSample, synthetic_line};
use crate::signal::DEFAULT_SAMPLES;
use crate::vegetation::discover_source;
use anyhow::{Context, Result};
use chrono::Local;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabConfig {
    pub signal: SignalConfig,
    pub dashboard: DashboardConfig,
    pub regression: RegressionConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalConfig {
    /// Number of samples on the time axis.
    pub samples: usize,
    /// Fixed noise seed; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { samples: DEFAULT_SAMPLES, seed: None }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Directory searched for today's cleaned-data CSV.
    pub data_dir: PathBuf,
    /// Explicit CSV path, bypassing discovery.
    pub source: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("."), source: None }
    }
}

impl DashboardConfig {
    /// The explicit source if set, otherwise today's cleaned-data file
    /// in `data_dir`.
    pub fn resolve_source(&self) -> crate::error::Result<PathBuf> {
        match &self.source {
            Some(path) => Ok(path.clone()),
            None => discover_source(&self.data_dir, Local::now().date_naive()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegressionConfig {
    pub slope: f64,
    pub intercept: f64,
    pub points: usize,
    pub x_max: f64,
    pub noise_sd: f64,
    pub seed: u64,
    /// Largest accepted difference between the two fits.
    pub tolerance: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            slope: 2.5,
            intercept: 1.0,
            points: 50,
            x_max: 10.0,
            noise_sd: 1.0,
            seed: 42,
            tolerance: 1e-6,
        }
    }
}

impl RegressionConfig {
    pub fn truth(&self) -> LineFit {
        LineFit::new(self.intercept, self.slope)
    }

    /// Generates the configured synthetic sample.
    pub fn sample(&self) -> crate::error::Result<LineSample> {
        synthetic_line(self.truth(), self.points, self.x_max, self.noise_sd, self.seed)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebConfig {
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:5006".to_string() }
    }
}

impl LabConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration TOML")
    }

    /// Reads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        assert_eq!(LabConfig::from_toml_str("").unwrap(), LabConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let cfg = LabConfig::from_toml_str(
            r#"
            [signal]
            seed = 3

            [regression]
            slope = -1.5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.signal.samples, DEFAULT_SAMPLES);
        assert_eq!(cfg.signal.seed, Some(3));
        assert_eq!(cfg.regression.slope, -1.5);
        assert_eq!(cfg.regression.points, 50);
        assert_eq!(cfg.web.bind, "127.0.0.1:5006");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(LabConfig::from_toml_str("[signal]\nsamplez = 3\n").is_err());
    }

    #[test]
    fn test_explicit_source_skips_discovery() {
        let cfg = LabConfig::from_toml_str("[dashboard]\nsource = \"data/veg.csv\"\n").unwrap();
        assert_eq!(cfg.dashboard.resolve_source().unwrap(), PathBuf::from("data/veg.csv"));

        let missing = DashboardConfig { data_dir: PathBuf::from("/nonexistent"), source: None };
        assert!(missing.resolve_source().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(LabConfig::load(Some(Path::new("/nonexistent/labkit.toml"))).is_err());
        assert!(LabConfig::load(None).is_ok());
    }
}
