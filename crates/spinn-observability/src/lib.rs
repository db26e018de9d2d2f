// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spinn-observability
//!
//! Logging setup shared by every spinn crate. Each crate logs through
//! `tracing` with an explicit `target:` equal to its crate name, so the
//! per-crate debug flags here can raise verbosity for one stage of the
//! compiler without drowning the rest.
//!
//! ## Features
//! - `file-logging`: additionally write logs to a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known spinn crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "spinn",
    "spinn-config",
    "spinn-structures",
    "spinn-keyspace",
    "spinn-connectivity",
    "spinn-partitioning",
    "spinn-memory",
];
