// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every check runs; all problems are reported together.

use crate::{ConfigError, ConfigResult, SpinnConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    OutOfRange { field: String, value: String, range: String },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, value, range } => {
                write!(f, "{} = {} is outside valid range ({})", field, value, range)
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &SpinnConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_keyspace(config, &mut errors);
    validate_machine(config, &mut errors);
    validate_fixed_point(config, &mut errors);
    validate_output(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_keyspace(config: &SpinnConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.keyspace.width == 0 || config.keyspace.width > 64 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "keyspace.width".to_string(),
            value: config.keyspace.width.to_string(),
            range: "1-64".to_string(),
        });
    }
    let reserved = config.keyspace.subvertex_bits.saturating_add(config.keyspace.dimension_bits);
    if reserved >= config.keyspace.width {
        errors.push(ConfigValidationError::InvalidValue {
            field: "keyspace.subvertex_bits".to_string(),
            reason: format!(
                "sub-vertex and dimension fields use {} of {} key bits, leaving none for routing",
                reserved, config.keyspace.width
            ),
        });
    }
}

fn validate_machine(config: &SpinnConfig, errors: &mut Vec<ConfigValidationError>) {
    let machine = &config.machine;

    for (field, value) in [
        ("machine.sdram_per_node", machine.sdram_per_node),
        ("machine.dtcm_per_core", machine.dtcm_per_core),
        ("machine.cpu_cycles_per_tick", machine.cpu_cycles_per_tick),
    ] {
        if value == 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: "budget must be non-zero".to_string(),
            });
        }
    }

    if !(machine.usage_fraction > 0.0 && machine.usage_fraction <= 1.0) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "machine.usage_fraction".to_string(),
            value: machine.usage_fraction.to_string(),
            range: "0.0 exclusive - 1.0 inclusive".to_string(),
        });
    }

    if machine
        .sdram_base_address
        .checked_add(machine.sdram_per_node)
        .is_none()
    {
        errors.push(ConfigValidationError::InvalidValue {
            field: "machine.sdram_base_address".to_string(),
            reason: "base address plus sdram_per_node exceeds the 32-bit address space"
                .to_string(),
        });
    }
}

fn validate_fixed_point(config: &SpinnConfig, errors: &mut Vec<ConfigValidationError>) {
    let fixed = &config.fixed_point;
    if fixed.n_bits == 0 || fixed.n_bits > 32 {
        errors.push(ConfigValidationError::OutOfRange {
            field: "fixed_point.n_bits".to_string(),
            value: fixed.n_bits.to_string(),
            range: "1-32".to_string(),
        });
    }
    if !(-32..=32).contains(&fixed.n_frac) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "fixed_point.n_frac".to_string(),
            value: fixed.n_frac.to_string(),
            range: "-32-32".to_string(),
        });
    }
}

fn validate_output(config: &SpinnConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.output.directory.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "output.directory".to_string(),
        });
    }
}
