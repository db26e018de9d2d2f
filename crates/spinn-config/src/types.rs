// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `spinn_configuration.toml`. Every
//! section is optional in the file; missing keys fall back to the defaults
//! below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpinnConfig {
    pub keyspace: KeyspaceConfig,
    pub machine: MachineConfig,
    pub application: ApplicationConfig,
    pub fixed_point: FixedPointConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Routing key layout
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyspaceConfig {
    /// Total key width in bits
    pub width: u32,
    /// Bits reserved for the sub-vertex index in default connection keys
    pub subvertex_bits: u32,
    /// Bits reserved for the dimension index in default connection keys
    pub dimension_bits: u32,
}

impl Default for KeyspaceConfig {
    fn default() -> Self {
        Self {
            width: 32,
            subvertex_bits: 8,
            dimension_bits: 6,
        }
    }
}

/// Per-node and per-core resource budgets
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Bytes of shared memory available to applications on each node
    pub sdram_per_node: u32,
    /// Device address of the first byte of that memory
    pub sdram_base_address: u32,
    /// Bytes of core-local data memory
    pub dtcm_per_core: u32,
    /// CPU cycles available to one core in one timer tick
    pub cpu_cycles_per_tick: u32,
    /// Fraction of each budget the partitioner may plan to use
    pub usage_fraction: f64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            sdram_per_node: 119 * 1024 * 1024,
            sdram_base_address: 0x6000_0000,
            dtcm_per_core: 64 * 1024,
            cpu_cycles_per_tick: 200_000,
            usage_fraction: 0.9,
        }
    }
}

/// Constants written into every application pointer table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub magic_number: u32,
    pub version: u32,
    /// Timer period in microseconds
    pub timer_period: u32,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            magic_number: 0xAD13_0AD6,
            version: 0x0001_0000,
            timer_period: 1000,
        }
    }
}

/// Fixed-point format used for matrix and list regions unless a region
/// overrides it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FixedPointConfig {
    pub n_bits: u32,
    pub n_frac: i32,
    pub signed: bool,
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        Self {
            n_bits: 32,
            n_frac: 15,
            signed: true,
        }
    }
}

/// Where region images and the load manifest are written
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub write_manifest: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("spinn_output"),
            write_manifest: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
