// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output always; with the `file-logging` feature an additional
//! plain-text log is written to a timestamped run folder:
//!
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── spinn.log
//! ```

use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

#[cfg(feature = "file-logging")]
use std::path::{Path, PathBuf};

/// Build the filter for the given flags and default level
///
/// A `RUST_LOG` value, when present, replaces the flag-derived filter.
pub fn build_env_filter(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<EnvFilter> {
    if let Ok(directives) = std::env::var("RUST_LOG") {
        return EnvFilter::try_new(&directives)
            .map_err(|e| anyhow!("Invalid RUST_LOG '{}': {}", directives, e));
    }
    let filter = debug_flags.to_filter_string(default_level);
    EnvFilter::try_new(&filter).map_err(|e| anyhow!("Invalid log filter '{}': {}", filter, e))
}

/// Install the console subscriber
///
/// Returns an error when the filter is malformed or a global subscriber is
/// already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<()> {
    let env_filter = build_env_filter(debug_flags, default_level)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(env_filter);

    Registry::default()
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Keeps the background log writer alive; logs are flushed on drop
#[cfg(feature = "file-logging")]
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
    log_dir: PathBuf,
}

#[cfg(feature = "file-logging")]
impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Install console and file subscribers
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags for filtering
/// * `default_level` - Level for crates without a debug flag
/// * `log_dir` - Base directory for run folders (default: `./logs`)
#[cfg(feature = "file-logging")]
pub fn init_file_logging(
    debug_flags: &CrateDebugFlags,
    default_level: &str,
    log_dir: Option<PathBuf>,
) -> Result<LoggingGuard> {
    use anyhow::Context;

    let base_log_dir = log_dir.unwrap_or_else(|| PathBuf::from("./logs"));
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_folder = base_log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(build_env_filter(debug_flags, default_level)?);

    let file_appender = tracing_appender::rolling::daily(&run_folder, "spinn.log");
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(build_env_filter(debug_flags, default_level)?);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_dir: run_folder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_flags_parses() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-spinn-memory".to_string()]);
        assert!(build_env_filter(&flags, "info").is_ok());
    }

    #[test]
    fn test_second_init_is_error_not_panic() {
        let flags = CrateDebugFlags::default();
        let _ = init_logging(&flags, "warn");
        assert!(init_logging(&flags, "warn").is_err());
    }
}
