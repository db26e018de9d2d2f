// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hierarchical bit-field keyspaces.
//!
//! A root [`Keyspace`] owns a field registry that every keyspace derived
//! from it shares. Binding values (`bind`) never changes the receiver; it
//! returns a new keyspace carrying the extra bindings. A field added on a
//! derived keyspace only exists while the bindings it was added under hold,
//! so sibling branches may reuse the same bits:
//!
//! ```
//! use spinn_keyspace::{FieldSpec, Keyspace};
//!
//! let ks = Keyspace::new(8).unwrap();
//! ks.add_field(FieldSpec::new("external").length(1).start_at(7)).unwrap();
//!
//! let internal = ks.bind([("external", 0)]).unwrap();
//! internal.add_field(FieldSpec::new("core").length(4).start_at(0)).unwrap();
//!
//! let external = ks.bind([("external", 1)]).unwrap();
//! external.add_field(FieldSpec::new("device").length(7).start_at(0)).unwrap();
//!
//! let key = ks.bind([("external", 0), ("core", 3)]).unwrap().get_key(None).unwrap();
//! assert_eq!(key, 0b0000_0011);
//! ```
//!
//! Fields without a length are sized by the largest value ever bound to
//! them, and fields without a position are packed from bit 0 upwards, the
//! first time a key or mask needs them. The first key or mask rendered
//! successfully also freezes the registry: no further fields can be added.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{KeyspaceError, KeyspaceResult};
use crate::field::{bit_length, low_bits, Field, FieldSpec};

#[derive(Debug, Default)]
struct FieldRegistry {
    fields: IndexMap<String, Field>,
    frozen: bool,
}

impl FieldRegistry {
    fn enabled<'a>(
        &'a self,
        field_values: &'a BTreeMap<String, u64>,
    ) -> impl Iterator<Item = (&'a String, &'a Field)> + 'a {
        self.fields
            .iter()
            .filter(move |(_, field)| field.is_enabled(field_values))
    }

    fn assert_available(
        &self,
        identifier: &str,
        field_values: &BTreeMap<String, u64>,
    ) -> KeyspaceResult<()> {
        let field = self
            .fields
            .get(identifier)
            .ok_or_else(|| KeyspaceError::UnknownField(identifier.to_string()))?;
        if !field.is_enabled(field_values) {
            return Err(KeyspaceError::FieldUnavailable {
                field: identifier.to_string(),
                requirements: field.unmet_conditions(field_values),
            });
        }
        Ok(())
    }

    fn assert_tag_exists(&self, tag: &str, field_values: &BTreeMap<String, u64>) -> KeyspaceResult<()> {
        if self.enabled(field_values).any(|(_, f)| f.tags.contains(tag)) {
            Ok(())
        } else {
            Err(KeyspaceError::UnknownTag(tag.to_string()))
        }
    }
}

/// Which fields a key or mask is built from
#[derive(Clone, Copy)]
enum Selector<'a> {
    All,
    Tag(&'a str),
    Field(&'a str),
}

#[derive(Clone)]
pub struct Keyspace {
    length: u32,
    registry: Arc<RwLock<FieldRegistry>>,
    field_values: BTreeMap<String, u64>,
}

impl Keyspace {
    /// Create a new root keyspace of `length` bits
    pub fn new(length: u32) -> KeyspaceResult<Self> {
        if length == 0 || length > 64 {
            return Err(KeyspaceError::InvalidWidth(length));
        }
        Ok(Keyspace {
            length,
            registry: Arc::new(RwLock::new(FieldRegistry::default())),
            field_values: BTreeMap::new(),
        })
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn field_values(&self) -> &BTreeMap<String, u64> {
        &self.field_values
    }

    /// Snapshot of a field definition
    pub fn field(&self, identifier: &str) -> Option<Field> {
        self.registry.read().fields.get(identifier).cloned()
    }

    pub fn is_frozen(&self) -> bool {
        self.registry.read().frozen
    }

    /// Register a new field, conditional on this keyspace's bindings.
    ///
    /// Explicitly positioned fields are checked against every other
    /// positioned field that may appear in the same key; a field whose
    /// length is still open counts as one bit wide for that check.
    pub fn add_field(&self, spec: FieldSpec) -> KeyspaceResult<()> {
        let mut registry = self.registry.write();
        let id = spec.identifier.as_str();

        if registry.frozen {
            return Err(KeyspaceError::FieldConflict(format!(
                "Cannot add field '{}': keys have already been generated",
                id
            )));
        }
        if registry.fields.contains_key(id) {
            return Err(KeyspaceError::FieldConflict(format!(
                "Field with identifier '{}' already exists",
                id
            )));
        }
        if spec.length == Some(0) {
            return Err(KeyspaceError::FieldConflict(format!(
                "Field '{}' must be at least one bit in length",
                id
            )));
        }

        if let Some(start_at) = spec.start_at {
            let span = spec.length.unwrap_or(1);
            if span > self.length || start_at > self.length - span {
                return Err(KeyspaceError::FieldConflict(format!(
                    "Field '{}' doesn't fit within {}-bit keyspace",
                    id, self.length
                )));
            }

            for (other_id, other) in registry.fields.iter() {
                let Some(other_start) = other.start_at else {
                    continue;
                };
                if !other.may_coexist_with(&self.field_values) {
                    continue;
                }
                // Both ranges already lie within the keyspace
                let end = start_at + span;
                let other_end = other_start + other.length.unwrap_or(1);
                if end > other_start && other_end > start_at {
                    return Err(KeyspaceError::FieldConflict(format!(
                        "Field '{}' (range {}-{}) overlaps field '{}' (range {}-{})",
                        id, start_at, end, other_id, other_start, other_end
                    )));
                }
            }
        }

        trace!(target: "spinn-keyspace", "Adding field '{}' under {:?}", id, self.field_values);
        registry.fields.insert(
            spec.identifier,
            Field {
                length: spec.length,
                start_at: spec.start_at,
                tags: spec.tags,
                conditions: self.field_values.clone(),
                max_value: 1,
            },
        );
        Ok(())
    }

    /// Return a new keyspace with additional field bindings.
    ///
    /// ```
    /// use spinn_keyspace::{FieldSpec, Keyspace};
    ///
    /// let ks = Keyspace::new(16).unwrap();
    /// ks.add_field(FieldSpec::new("a").length(8).start_at(0)).unwrap();
    /// let bound = ks.bind([("a", 7)]).unwrap();
    /// assert_eq!(bound.get("a").unwrap(), Some(7));
    /// assert_eq!(ks.get("a").unwrap(), None);
    /// ```
    pub fn bind<I, K>(&self, values: I) -> KeyspaceResult<Keyspace>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let mut registry = self.registry.write();

        let mut new_values: BTreeMap<String, u64> = BTreeMap::new();
        for (name, value) in values {
            let name = name.into();
            if !registry.fields.contains_key(&name) {
                return Err(KeyspaceError::Binding(format!("Field '{}' not defined", name)));
            }
            if self.field_values.contains_key(&name) || new_values.contains_key(&name) {
                return Err(KeyspaceError::Binding(format!(
                    "Field '{}' already has value",
                    name
                )));
            }
            new_values.insert(name, value);
        }

        let mut combined = self.field_values.clone();
        combined.extend(new_values.iter().map(|(k, v)| (k.clone(), *v)));

        for name in combined.keys() {
            let field = &registry.fields[name.as_str()];
            if !field.is_enabled(&combined) {
                return Err(KeyspaceError::Binding(format!(
                    "Field '{}' requires that {}",
                    name,
                    field.unmet_conditions(&combined)
                )));
            }
        }

        for (name, value) in &new_values {
            let field = &registry.fields[name.as_str()];
            if let Some(length) = field.length {
                if *value > low_bits(length) {
                    return Err(KeyspaceError::Binding(format!(
                        "Value {} too large for {}-bit field '{}'",
                        value, length, name
                    )));
                }
            }
        }

        for (name, value) in &new_values {
            if let Some(field) = registry.fields.get_mut(name.as_str()) {
                field.max_value = field.max_value.max(*value);
            }
        }

        Ok(Keyspace {
            length: self.length,
            registry: Arc::clone(&self.registry),
            field_values: combined,
        })
    }

    /// Value bound to an available field, `None` if not yet bound
    pub fn get(&self, identifier: &str) -> KeyspaceResult<Option<u64>> {
        self.registry
            .read()
            .assert_available(identifier, &self.field_values)?;
        Ok(self.field_values.get(identifier).copied())
    }

    /// Key made of every enabled field, or only those carrying `tag`.
    ///
    /// Every selected field must be bound. Freezes the registry.
    pub fn get_key(&self, tag: Option<&str>) -> KeyspaceResult<u64> {
        self.render_key(tag.map_or(Selector::All, Selector::Tag))
    }

    /// Key containing only `field`
    pub fn get_field_key(&self, field: &str) -> KeyspaceResult<u64> {
        self.render_key(Selector::Field(field))
    }

    /// Mask covering every enabled field, or only those carrying `tag`.
    ///
    /// Unlike [`Keyspace::get_key`], fields need not be bound. Freezes the
    /// registry.
    pub fn get_mask(&self, tag: Option<&str>) -> KeyspaceResult<u64> {
        self.render_mask(tag.map_or(Selector::All, Selector::Tag))
    }

    /// Mask covering only `field`
    pub fn get_field_mask(&self, field: &str) -> KeyspaceResult<u64> {
        self.render_mask(Selector::Field(field))
    }

    /// Identifiers selected by `selector`, and the enabled identifiers whose
    /// bits must be fixed before rendering them
    fn select(
        &self,
        registry: &FieldRegistry,
        selector: Selector<'_>,
        assign_tagged_only: bool,
    ) -> KeyspaceResult<(Vec<String>, Vec<String>)> {
        let enabled: Vec<(&String, &Field)> = registry.enabled(&self.field_values).collect();

        let selected: Vec<String> = match selector {
            Selector::All => enabled.iter().map(|(id, _)| (*id).clone()).collect(),
            Selector::Tag(tag) => {
                registry.assert_tag_exists(tag, &self.field_values)?;
                enabled
                    .iter()
                    .filter(|(_, f)| f.tags.contains(tag))
                    .map(|(id, _)| (*id).clone())
                    .collect()
            }
            Selector::Field(field) => {
                registry.assert_available(field, &self.field_values)?;
                vec![field.to_string()]
            }
        };

        let to_assign = match selector {
            Selector::Tag(_) if assign_tagged_only => selected.clone(),
            _ => enabled.iter().map(|(id, _)| (*id).clone()).collect(),
        };

        Ok((selected, to_assign))
    }

    fn render_key(&self, selector: Selector<'_>) -> KeyspaceResult<u64> {
        let mut registry = self.registry.write();

        let (selected, to_assign) = self.select(&registry, selector, true)?;

        let missing: Vec<String> = selected
            .iter()
            .filter(|id| !self.field_values.contains_key(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(KeyspaceError::Incomplete { missing });
        }

        self.assign_field_bits(&mut registry, &to_assign)?;

        let mut key = 0u64;
        for id in &selected {
            let start_at = registry.fields[id.as_str()].start_at.unwrap_or(0);
            key |= self.field_values[id.as_str()] << start_at;
        }
        registry.frozen = true;
        Ok(key)
    }

    fn render_mask(&self, selector: Selector<'_>) -> KeyspaceResult<u64> {
        let mut registry = self.registry.write();

        let (selected, to_assign) = self.select(&registry, selector, false)?;
        self.assign_field_bits(&mut registry, &to_assign)?;

        let mut mask = 0u64;
        for id in &selected {
            let field = &registry.fields[id.as_str()];
            if let (Some(length), Some(start_at)) = (field.length, field.start_at) {
                mask |= low_bits(length) << start_at;
            }
        }
        registry.frozen = true;
        Ok(mask)
    }

    /// Fix the length and position of every listed field that lacks one.
    ///
    /// Fields are visited in registry insertion order, so fields defined
    /// higher up the hierarchy are packed first.
    fn assign_field_bits(&self, registry: &mut FieldRegistry, identifiers: &[String]) -> KeyspaceResult<()> {
        let mut assigned_bits = 0u64;
        for (_, field) in registry.enabled(&self.field_values) {
            if let (Some(length), Some(start_at)) = (field.length, field.start_at) {
                assigned_bits |= low_bits(length) << start_at;
            }
        }

        for (id, field) in registry.fields.iter_mut() {
            if !identifiers.iter().any(|i| i == id) {
                continue;
            }

            let max_value = field.max_value;
            let length = *field.length.get_or_insert_with(|| bit_length(max_value));

            if field.start_at.is_none() && length <= self.length {
                field.start_at = (0..=self.length - length)
                    .find(|bit| assigned_bits & (low_bits(length) << bit) == 0);
                if let Some(start_at) = field.start_at {
                    debug!(
                        target: "spinn-keyspace",
                        "Placed {}-bit field '{}' at bit {}", length, id, start_at
                    );
                }
            }

            match field.start_at {
                Some(start_at) if length <= self.length && start_at <= self.length - length => {
                    assigned_bits |= low_bits(length) << start_at;
                }
                _ => {
                    return Err(KeyspaceError::FieldConflict(format!(
                        "{}-bit field '{}' does not fit in {}-bit keyspace",
                        length, id, self.length
                    )));
                }
            }
        }

        Ok(())
    }
}

impl PartialEq for Keyspace {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry)
            && self.length == other.length
            && self.field_values == other.field_values
    }
}

impl Eq for Keyspace {}

impl Hash for Keyspace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        self.field_values.hash(state);
    }
}

impl Display for Keyspace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        let fields = registry
            .enabled(&self.field_values)
            .map(|(id, _)| match self.field_values.get(id) {
                Some(value) => format!("'{}':{}", id, value),
                None => format!("'{}':?", id),
            })
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "<{}-bit Keyspace {}>", self.length, fields)
    }
}

impl Debug for Keyspace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
