// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Reduced connections: the parts of a connection that matter to the
//! transmitting side (outgoing) and to the receiving side (incoming).

use spinn_keyspace::Keyspace;
use spinn_structures::{ObjectId, SampleMatrix, Slice, TransformMatrix};
use std::hash::{Hash, Hasher};

use crate::filter::FilterParameter;
use crate::function::FunctionRef;
use crate::learning::LearningRuleId;

/// Input of a receiving object a connection is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Port {
    StandardInput,
    GlobalInhibition,
    LearningRule(LearningRuleId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub object: ObjectId,
    pub slice: Slice,
    pub port: Port,
}

/// Leaf of the connection tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IncomingReducedConnection {
    pub target: Target,
    pub filter: FilterParameter,
}

/// Decoder solver settings
#[derive(Debug, Clone)]
pub struct Solver {
    pub name: String,
    pub regularization: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Solver {
            name: "LstsqL2".to_string(),
            regularization: 0.1,
        }
    }
}

impl PartialEq for Solver {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.regularization.to_bits() == other.regularization.to_bits()
    }
}

impl Eq for Solver {}

impl Hash for Solver {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.regularization.to_bits().hash(state);
    }
}

/// What produces the values a connection transmits
#[derive(Debug, Clone)]
pub enum ReducedSource {
    /// Values computed directly; the function is compared by identity
    Plain { function: Option<FunctionRef> },
    /// Values decoded from an ensemble. Two ensemble sources are the same
    /// when they sample the same function on the same points, so the
    /// function handle itself is not compared.
    Ensemble {
        eval_points: SampleMatrix,
        solver: Solver,
        evaluated_function: SampleMatrix,
        transmitter_learning_rule: Option<LearningRuleId>,
        function: Option<FunctionRef>,
    },
}

impl ReducedSource {
    pub fn function(&self) -> Option<&FunctionRef> {
        match self {
            ReducedSource::Plain { function } | ReducedSource::Ensemble { function, .. } => function.as_ref(),
        }
    }
}

impl PartialEq for ReducedSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReducedSource::Plain { function: a }, ReducedSource::Plain { function: b }) => a == b,
            (
                ReducedSource::Ensemble {
                    eval_points: points_a,
                    solver: solver_a,
                    evaluated_function: samples_a,
                    transmitter_learning_rule: rule_a,
                    ..
                },
                ReducedSource::Ensemble {
                    eval_points: points_b,
                    solver: solver_b,
                    evaluated_function: samples_b,
                    transmitter_learning_rule: rule_b,
                    ..
                },
            ) => points_a == points_b && solver_a == solver_b && samples_a == samples_b && rule_a == rule_b,
            _ => false,
        }
    }
}

impl Eq for ReducedSource {}

impl Hash for ReducedSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ReducedSource::Plain { function } => {
                0u8.hash(state);
                function.hash(state);
            }
            ReducedSource::Ensemble {
                eval_points,
                solver,
                evaluated_function,
                transmitter_learning_rule,
                ..
            } => {
                1u8.hash(state);
                eval_points.hash(state);
                solver.hash(state);
                evaluated_function.hash(state);
                transmitter_learning_rule.hash(state);
            }
        }
    }
}

/// Key of the connection tree: connections leaving an object that compare
/// equal can share one transmitted stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutgoingReducedConnection {
    pub width: usize,
    pub transform: TransformMatrix,
    pub pre_slice: Slice,
    pub post_slice: Slice,
    pub keyspace: Option<Keyspace>,
    pub source: ReducedSource,
}

impl OutgoingReducedConnection {
    /// Copy with every transform element multiplied by `scale`
    pub fn copy_with_transform(&self, scale: f64) -> Self {
        OutgoingReducedConnection {
            transform: self.transform.scaled(scale),
            ..self.clone()
        }
    }

    pub fn with_keyspace(&self, keyspace: Keyspace) -> Self {
        OutgoingReducedConnection {
            keyspace: Some(keyspace),
            ..self.clone()
        }
    }

    pub fn is_decoded(&self) -> bool {
        matches!(self.source, ReducedSource::Ensemble { .. })
    }
}
