// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file
//! 2. `SPINN_*` environment variables
//! 3. CLI arguments

use crate::{ConfigError, ConfigResult, SpinnConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "spinn_configuration.toml";

/// Find the spinn configuration file
///
/// Search order:
/// 1. `SPINN_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SPINN_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SPINN_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet SPINN_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file and apply overrides
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Validation is a separate step, see [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SpinnConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SpinnConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Parse an integer that may be written in hex (`0x...`)
fn parse_u32(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => trimmed.parse().ok(),
    }
}

fn parse_bool(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower == "true" || lower == "1" || lower == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SPINN_KEYSPACE_WIDTH` -> `keyspace.width`
/// - `SPINN_SDRAM_PER_NODE` -> `machine.sdram_per_node`
/// - `SPINN_SDRAM_BASE_ADDRESS` -> `machine.sdram_base_address`
/// - `SPINN_DTCM_PER_CORE` -> `machine.dtcm_per_core`
/// - `SPINN_CPU_CYCLES_PER_TICK` -> `machine.cpu_cycles_per_tick`
/// - `SPINN_TIMER_PERIOD` -> `application.timer_period`
/// - `SPINN_OUTPUT_DIR` -> `output.directory`
/// - `SPINN_WRITE_MANIFEST` -> `output.write_manifest`
/// - `SPINN_LOG_LEVEL` -> `logging.level`
///
/// Unparseable numeric values are ignored.
pub fn apply_environment_overrides(config: &mut SpinnConfig) {
    if let Some(width) = env::var("SPINN_KEYSPACE_WIDTH").ok().as_deref().and_then(parse_u32) {
        config.keyspace.width = width;
    }
    if let Some(v) = env::var("SPINN_SDRAM_PER_NODE").ok().as_deref().and_then(parse_u32) {
        config.machine.sdram_per_node = v;
    }
    if let Some(v) = env::var("SPINN_SDRAM_BASE_ADDRESS").ok().as_deref().and_then(parse_u32) {
        config.machine.sdram_base_address = v;
    }
    if let Some(v) = env::var("SPINN_DTCM_PER_CORE").ok().as_deref().and_then(parse_u32) {
        config.machine.dtcm_per_core = v;
    }
    if let Some(v) = env::var("SPINN_CPU_CYCLES_PER_TICK").ok().as_deref().and_then(parse_u32) {
        config.machine.cpu_cycles_per_tick = v;
    }
    if let Some(v) = env::var("SPINN_TIMER_PERIOD").ok().as_deref().and_then(parse_u32) {
        config.application.timer_period = v;
    }
    if let Ok(value) = env::var("SPINN_OUTPUT_DIR") {
        config.output.directory = PathBuf::from(value);
    }
    if let Ok(value) = env::var("SPINN_WRITE_MANIFEST") {
        config.output.write_manifest = parse_bool(&value);
    }
    if let Ok(value) = env::var("SPINN_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// Unlike environment overrides, a malformed CLI value is an error: the
/// user asked for it explicitly.
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - e.g. `{"sdram_per_node": "0x1000000", "output_dir": "out"}`
pub fn apply_cli_overrides(
    config: &mut SpinnConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    let numeric = |key: &str| -> ConfigResult<Option<u32>> {
        match cli_args.get(key) {
            Some(value) => parse_u32(value).map(Some).ok_or_else(|| {
                ConfigError::InvalidValue(format!("{} = '{}' is not an integer", key, value))
            }),
            None => Ok(None),
        }
    };

    if let Some(v) = numeric("keyspace_width")? {
        config.keyspace.width = v;
    }
    if let Some(v) = numeric("sdram_per_node")? {
        config.machine.sdram_per_node = v;
    }
    if let Some(v) = numeric("sdram_base_address")? {
        config.machine.sdram_base_address = v;
    }
    if let Some(v) = numeric("dtcm_per_core")? {
        config.machine.dtcm_per_core = v;
    }
    if let Some(v) = numeric("timer_period")? {
        config.application.timer_period = v;
    }
    if let Some(value) = cli_args.get("usage_fraction") {
        config.machine.usage_fraction = value.parse().map_err(|_| {
            ConfigError::InvalidValue(format!("usage_fraction = '{}' is not a number", value))
        })?;
    }
    if let Some(value) = cli_args.get("output_dir") {
        config.output.directory = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("write_manifest") {
        config.output.write_manifest = parse_bool(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }

    Ok(())
}
