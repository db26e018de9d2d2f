// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Network objects as seen by the compiler.

use indexmap::IndexMap;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::error::{SpinnDataError, SpinnDataResult};

/// Identity of a network object, and of the vertex built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Every kind of object the compiler knows how to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Ensemble,
    Node,
    /// The neurons of an ensemble, addressed directly
    Neurons,
    /// Target of a global inhibition connection
    GlobalInhibitionTarget,
    Filter,
    ValueSource,
    ValueSink,
}

impl ObjectKind {
    /// Objects whose output is decoded from internal state
    pub fn is_stateful(&self) -> bool {
        matches!(self, ObjectKind::Ensemble)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkObject {
    pub id: ObjectId,
    pub label: String,
    pub kind: ObjectKind,
    pub size_in: usize,
    pub size_out: usize,
    /// Evaluation points, one row per point, `size_out` columns
    pub eval_points: Option<Array2<f64>>,
}

impl NetworkObject {
    pub fn new(id: ObjectId, label: impl Into<String>, kind: ObjectKind, size_in: usize, size_out: usize) -> Self {
        NetworkObject {
            id,
            label: label.into(),
            kind,
            size_in,
            size_out,
            eval_points: None,
        }
    }

    pub fn with_eval_points(mut self, eval_points: Array2<f64>) -> Self {
        self.eval_points = Some(eval_points);
        self
    }
}

impl Display for NetworkObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} '{}' ({})", self.kind, self.label, self.id)
    }
}

/// Objects of one network, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRegistry {
    objects: IndexMap<ObjectId, NetworkObject>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object; ids must be unique
    pub fn insert(&mut self, object: NetworkObject) -> SpinnDataResult<()> {
        if self.objects.contains_key(&object.id) {
            return Err(SpinnDataError::BadParameters(format!(
                "Object {} is already registered",
                object.id
            )));
        }
        self.objects.insert(object.id, object);
        Ok(())
    }

    pub fn get(&self, id: ObjectId) -> SpinnDataResult<&NetworkObject> {
        self.objects
            .get(&id)
            .ok_or_else(|| SpinnDataError::BadParameters(format!("Unknown object {}", id)))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// An id not used by any registered object
    pub fn next_id(&self) -> ObjectId {
        ObjectId(self.objects.keys().map(|id| id.0 + 1).max().unwrap_or(0))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
