// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Field definitions.

use std::collections::{BTreeMap, BTreeSet};

/// A named bit-range within a key.
///
/// `length` and `start_at` stay `None` until fixed explicitly or by the
/// first key/mask generation that needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub length: Option<u32>,
    pub start_at: Option<u32>,
    pub tags: BTreeSet<String>,
    /// Field values that must hold for this field to exist
    pub conditions: BTreeMap<String, u64>,
    /// Largest value ever bound, used for automatic sizing
    pub max_value: u64,
}

impl Field {
    pub(crate) fn is_enabled(&self, field_values: &BTreeMap<String, u64>) -> bool {
        self.conditions
            .iter()
            .all(|(name, value)| field_values.get(name) == Some(value))
    }

    /// True when no condition of either field pins a shared field to
    /// different values, i.e. both fields may appear in one key.
    pub(crate) fn may_coexist_with(&self, conditions: &BTreeMap<String, u64>) -> bool {
        self.conditions
            .iter()
            .all(|(name, value)| conditions.get(name).map_or(true, |v| v == value))
    }

    /// Conditions not met by `field_values`, formatted for error messages
    pub(crate) fn unmet_conditions(&self, field_values: &BTreeMap<String, u64>) -> String {
        self.conditions
            .iter()
            .filter(|(name, value)| field_values.get(*name) != Some(*value))
            .map(|(name, value)| format!("'{}' == {}", name, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Arguments to [`crate::Keyspace::add_field`].
///
/// ```
/// use spinn_keyspace::FieldSpec;
///
/// let spec = FieldSpec::new("chip").length(8).start_at(24).tag("routing");
/// assert_eq!(spec.identifier(), "chip");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub(crate) identifier: String,
    pub(crate) length: Option<u32>,
    pub(crate) start_at: Option<u32>,
    pub(crate) tags: BTreeSet<String>,
}

impl FieldSpec {
    pub fn new(identifier: impl Into<String>) -> Self {
        FieldSpec {
            identifier: identifier.into(),
            length: None,
            start_at: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn start_at(mut self, start_at: u32) -> Self {
        self.start_at = Some(start_at);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add tags from a whitespace separated list, e.g. `"routing local"`
    pub fn tags(mut self, tags: &str) -> Self {
        self.tags.extend(tags.split_whitespace().map(str::to_string));
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Mask of `length` low bits
pub(crate) fn low_bits(length: u32) -> u64 {
    if length >= 64 {
        u64::MAX
    } else {
        (1u64 << length) - 1
    }
}

/// Number of bits needed to hold `value`, at least 1
pub(crate) fn bit_length(value: u64) -> u32 {
    (64 - value.max(1).leading_zeros()).max(1)
}
