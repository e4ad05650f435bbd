//! Structured logging for tiercast.
//!
//! `tracing` with two output formats:
//!
//! - **Pretty**: human-friendly output for interactive use
//! - **JSON**: machine-parseable JSON lines for CI and ops
//!
//! An optional log file receives the same stream. The `RUST_LOG`
//! environment variable overrides the configured level filter.
//!
//! Flush outcomes, artifact load problems, and lifecycle transitions are
//! all reported through this layer — the engine itself never prints.

use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Global flag to track whether logging has been initialized.
static LOGGING_INITIALIZED: OnceLock<bool> = OnceLock::new();

// =============================================================================
// Configuration
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-friendly output.
    #[default]
    Pretty,
    /// JSON lines.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level filter (trace, debug, info, warn, error). Overridden by
    /// the `RUST_LOG` environment variable when set.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Optional log file path; when set, log lines are also written there.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

// =============================================================================
// Initialization
// =============================================================================

/// Error type for logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// `init_logging` was called twice.
    #[error("logging already initialized")]
    AlreadyInitialized,

    /// The configured log file could not be created.
    #[error("failed to create log file: {0}")]
    FileCreate(#[from] io::Error),

    /// Another subscriber is already installed globally.
    #[error("failed to set global subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize logging once at startup.
///
/// The `RUST_LOG` environment variable overrides the configured level.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_writer = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(file)
        }
        None => None,
    };

    match config.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(io::stderr).with_target(true));
            if let Some(file) = file_writer {
                let file_layer = fmt::layer().with_writer(file).with_ansi(false);
                tracing::subscriber::set_global_default(subscriber.with(file_layer))?;
            } else {
                tracing::subscriber::set_global_default(subscriber)?;
            }
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(io::stderr));
            if let Some(file) = file_writer {
                let file_layer = fmt::layer().json().with_writer(file);
                tracing::subscriber::set_global_default(subscriber.with(file_layer))?;
            } else {
                tracing::subscriber::set_global_default(subscriber)?;
            }
        }
    }

    let _ = LOGGING_INITIALIZED.set(true);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
