// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spinn Configuration System
//!
//! Type-safe configuration for one compilation run:
//! - machine budgets (SDRAM per node, DTCM per core, CPU cycles per tick)
//! - keyspace width and fixed-point format defaults
//! - application header constants and output location
//!
//! Values come from a TOML file, then `SPINN_*` environment variables, then
//! explicit CLI overrides.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use spinn_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//! println!("SDRAM per node: {}", config.machine.sdram_per_node);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Failures while locating, reading or checking a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No `spinn_configuration.toml` in any searched location
    #[error("No configuration file found (searched {0})")]
    FileNotFound(String),

    #[error("Cannot read configuration: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed TOML: {0}")]
    ParseError(String),

    /// Every problem reported by [`validate_config`], one per line
    #[error("Configuration rejected:\n{0}")]
    ValidationError(String),

    /// An override could not be parsed for its field
    #[error("Bad override: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.message().to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
