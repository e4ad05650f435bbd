//! Configuration for the telemetry engine.
//!
//! A single TOML file with two sections, every field defaulted so an empty
//! (or absent) file yields a working setup:
//!
//! ```toml
//! [history]
//! capacity = 10000
//! flush_every = 10
//! path = "/var/lib/tiercast/history.json"
//!
//! [log]
//! level = "info"
//! format = "pretty"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::LogConfig;

// =============================================================================
// TiercastConfig
// =============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TiercastConfig {
    /// History buffer and persistence settings.
    pub history: HistoryConfig,
    /// Logging settings.
    pub log: LogConfig,
}

impl TiercastConfig {
    /// Load configuration from a TOML file.
    ///
    /// `None`, or a path that does not exist, yields the defaults. A file
    /// that exists but cannot be read or parsed is an error — a present but
    /// broken config should fail loudly, unlike absent state.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.display().to_string(), e.to_string()))?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.capacity == 0 {
            return Err(ConfigError::Validation("history.capacity must be > 0".into()));
        }
        if self.history.flush_every == 0 {
            return Err(ConfigError::Validation(
                "history.flush_every must be > 0".into(),
            ));
        }
        if self.history.quantile_floor == 0 {
            return Err(ConfigError::Validation(
                "history.quantile_floor must be > 0".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// HistoryConfig
// =============================================================================

/// History buffer and persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of buffered records.
    pub capacity: usize,

    /// Flush the history artifact every Nth append (a counting trigger,
    /// not a timer).
    pub flush_every: u64,

    /// Minimum per-segment sample count for quantile-derived thresholds.
    pub quantile_floor: usize,

    /// Artifact location. Defaults to `tiercast/history.json` under the
    /// platform data directory.
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            flush_every: 10,
            quantile_floor: crate::analytics::QUANTILE_FLOOR,
            path: None,
        }
    }
}

impl HistoryConfig {
    /// Resolve the artifact path, falling back to the platform data dir.
    #[must_use]
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tiercast")
            .join("history.json")
    }
}

// =============================================================================
// Tests
// =============================================================================
