// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Front-end connections and their expansion into full-transform form.

use ndarray::Array2;
use spinn_keyspace::Keyspace;
use spinn_structures::{ObjectId, ObjectKind, ObjectRegistry, SampleMatrix, Slice, Transform, TransformMatrix};
use tracing::debug;

use crate::error::{ConnectivityError, ConnectivityResult};
use crate::filter::{FilterParameter, Synapse};
use crate::function::FunctionRef;
use crate::learning::LearningRule;
use crate::reduced::{
    IncomingReducedConnection, OutgoingReducedConnection, Port, ReducedSource, Solver, Target,
};

/// Time constant of the synapse a connection gets when none is given
pub const DEFAULT_SYNAPSE_TAU: f64 = 0.005;

/// A connection as handed over by the graph front-end
#[derive(Debug, Clone)]
pub struct Connection {
    pub pre: ObjectId,
    pub post: ObjectId,
    /// Dimensions of `pre` read; all of them when `None`
    pub pre_slice: Option<Slice>,
    /// Dimensions of `post` written; all of them when `None`
    pub post_slice: Option<Slice>,
    pub transform: Transform,
    pub synapse: Option<Synapse>,
    pub function: Option<FunctionRef>,
    pub solver: Solver,
    pub eval_points: Option<Array2<f64>>,
    pub learning_rule: Option<LearningRule>,
    pub keyspace: Option<Keyspace>,
    pub target_port: Port,
    pub is_accumulatory: bool,
}

impl Connection {
    pub fn new(pre: ObjectId, post: ObjectId) -> Self {
        Connection {
            pre,
            post,
            pre_slice: None,
            post_slice: None,
            transform: Transform::Scalar(1.0),
            synapse: Some(Synapse::Lowpass {
                tau: DEFAULT_SYNAPSE_TAU,
            }),
            function: None,
            solver: Solver::default(),
            eval_points: None,
            learning_rule: None,
            keyspace: None,
            target_port: Port::StandardInput,
            is_accumulatory: true,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_synapse(mut self, synapse: Option<Synapse>) -> Self {
        self.synapse = synapse;
        self
    }

    pub fn with_function(mut self, function: FunctionRef) -> Self {
        self.function = Some(function);
        self
    }

    pub fn with_slices(mut self, pre_slice: Option<Slice>, post_slice: Option<Slice>) -> Self {
        self.pre_slice = pre_slice;
        self.post_slice = post_slice;
        self
    }

    pub fn with_solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_eval_points(mut self, eval_points: Array2<f64>) -> Self {
        self.eval_points = Some(eval_points);
        self
    }

    pub fn with_learning_rule(mut self, rule: LearningRule) -> Self {
        self.learning_rule = Some(rule);
        self
    }

    pub fn with_keyspace(mut self, keyspace: Keyspace) -> Self {
        self.keyspace = Some(keyspace);
        self
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.target_port = port;
        self
    }

    pub fn non_accumulatory(mut self) -> Self {
        self.is_accumulatory = false;
        self
    }
}

/// A connection with its transform expanded to `post.size_in` rows and one
/// column per value entering the transform.
#[derive(Debug, Clone)]
pub struct IntermediateConnection {
    pub pre_obj: ObjectId,
    pub pre_kind: ObjectKind,
    pub post_obj: ObjectId,
    pub post_kind: ObjectKind,
    pub pre_slice: Slice,
    pub post_slice: Slice,
    pub transform: TransformMatrix,
    pub synapse: Option<Synapse>,
    pub function: Option<FunctionRef>,
    pub solver: Solver,
    /// Resolved evaluation points; only present for ensemble sources
    pub eval_points: Option<Array2<f64>>,
    pub keyspace: Option<Keyspace>,
    pub is_accumulatory: bool,
    pub learning_rule: Option<LearningRule>,
    pub target_port: Port,
    pub width: usize,
}

impl IntermediateConnection {
    pub fn from_connection(connection: &Connection, objects: &ObjectRegistry) -> ConnectivityResult<Self> {
        let pre = objects.get(connection.pre)?;
        let post = objects.get(connection.post)?;

        let pre_slice = match connection.pre_slice {
            Some(slice) => slice,
            None => Slice::full(pre.size_out)?,
        };
        let post_slice = match connection.post_slice {
            Some(slice) => slice,
            None => Slice::full(post.size_in)?,
        };
        if pre_slice.stop() > pre.size_out {
            return Err(ConnectivityError::InvalidConnection(format!(
                "{} exceeds the {} outputs of {}",
                pre_slice, pre.size_out, pre
            )));
        }

        // A function consumes the pre slice; the transform then reads the
        // whole function output.
        let transform = match &connection.function {
            Some(function) => connection.transform.full(
                function.size_out(),
                post.size_in,
                Slice::full(function.size_out())?,
                post_slice,
            )?,
            None => connection
                .transform
                .full(pre.size_out, post.size_in, pre_slice, post_slice)?,
        };

        let eval_points = if pre.kind == ObjectKind::Ensemble {
            let points = connection
                .eval_points
                .as_ref()
                .or(pre.eval_points.as_ref())
                .ok_or_else(|| {
                    ConnectivityError::InvalidConnection(format!("{} has no evaluation points", pre))
                })?;
            if points.ncols() != pre.size_out {
                return Err(ConnectivityError::InvalidConnection(format!(
                    "Evaluation points for {} have {} columns, expected {}",
                    pre,
                    points.ncols(),
                    pre.size_out
                )));
            }
            Some(points.clone())
        } else {
            None
        };

        match &connection.learning_rule {
            Some(LearningRule::Unsupported(name)) => {
                return Err(ConnectivityError::UnsupportedConstruct(format!(
                    "learning rule '{}' on connection {} -> {}",
                    name, pre, post
                )));
            }
            Some(LearningRule::Pes { .. }) if pre.kind != ObjectKind::Ensemble => {
                return Err(ConnectivityError::UnsupportedConstruct(format!(
                    "PES learning on connection from non-ensemble {}",
                    pre
                )));
            }
            _ => {}
        }

        FilterParameter::from_synapse(connection.synapse.as_ref(), connection.is_accumulatory)?;

        debug!(
            target: "spinn-connectivity",
            "Expanded connection {} -> {} to {}x{} transform",
            pre,
            post,
            transform.n_rows(),
            transform.n_cols()
        );

        Ok(IntermediateConnection {
            pre_obj: pre.id,
            pre_kind: pre.kind,
            post_obj: post.id,
            post_kind: post.kind,
            pre_slice,
            post_slice,
            width: transform.n_rows(),
            transform,
            synapse: connection.synapse.clone(),
            function: connection.function.clone(),
            solver: connection.solver.clone(),
            eval_points,
            keyspace: connection.keyspace.clone(),
            is_accumulatory: connection.is_accumulatory,
            learning_rule: connection.learning_rule.clone(),
            target_port: connection.target_port,
        })
    }

    pub fn get_reduced_outgoing_connection(&self) -> ConnectivityResult<OutgoingReducedConnection> {
        let source = match &self.eval_points {
            Some(points) => {
                let evaluated_function = match &self.function {
                    Some(function) => function.evaluate(points, self.pre_slice)?,
                    None => {
                        let columns: Vec<usize> = self.pre_slice.as_range().collect();
                        SampleMatrix::new(points.select(ndarray::Axis(1), &columns))
                    }
                };
                let transmitter_learning_rule = match &self.learning_rule {
                    Some(LearningRule::Pes { id, .. }) => Some(*id),
                    _ => None,
                };
                ReducedSource::Ensemble {
                    eval_points: SampleMatrix::new(points.clone()),
                    solver: self.solver.clone(),
                    evaluated_function,
                    transmitter_learning_rule,
                    function: self.function.clone(),
                }
            }
            None => ReducedSource::Plain {
                function: self.function.clone(),
            },
        };

        Ok(OutgoingReducedConnection {
            width: self.width,
            transform: self.transform.clone(),
            pre_slice: self.pre_slice,
            post_slice: self.post_slice,
            keyspace: self.keyspace.clone(),
            source,
        })
    }

    pub fn get_reduced_incoming_connection(&self) -> ConnectivityResult<IncomingReducedConnection> {
        Ok(IncomingReducedConnection {
            target: Target {
                object: self.post_obj,
                slice: Slice::full(self.width)?,
                port: self.target_port,
            },
            filter: FilterParameter::from_synapse(self.synapse.as_ref(), self.is_accumulatory)?,
        })
    }

    /// Turn an ensemble -> neurons connection with a uniform transform into
    /// a single-row connection to the global inhibition port.
    pub fn into_global_inhibition(self) -> ConnectivityResult<Self> {
        if self.pre_kind != ObjectKind::Ensemble || self.post_kind != ObjectKind::Neurons {
            return Err(ConnectivityError::UnsupportedConstruct(format!(
                "global inhibition requires an ensemble -> neurons connection, got {:?} -> {:?}",
                self.pre_kind, self.post_kind
            )));
        }
        let gain = self.transform.uniform_value().ok_or_else(|| {
            ConnectivityError::UnsupportedConstruct(format!(
                "non-uniform transform on inhibitory connection {} -> {}",
                self.pre_obj, self.post_obj
            ))
        })?;

        let transform = TransformMatrix::new(Array2::from_elem((1, self.transform.n_cols()), gain));
        Ok(IntermediateConnection {
            transform,
            width: 1,
            post_slice: Slice::single(0)?,
            target_port: Port::GlobalInhibition,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use spinn_structures::NetworkObject;

    fn registry() -> ObjectRegistry {
        let mut objects = ObjectRegistry::new();
        objects
            .insert(
                NetworkObject::new(ObjectId(0), "ens", ObjectKind::Ensemble, 2, 2)
                    .with_eval_points(array![[0.5, 0.0], [-0.5, 1.0], [0.0, -1.0]]),
            )
            .unwrap();
        objects
            .insert(NetworkObject::new(ObjectId(1), "node", ObjectKind::Node, 3, 3))
            .unwrap();
        objects
            .insert(NetworkObject::new(ObjectId(2), "neurons", ObjectKind::Neurons, 4, 4))
            .unwrap();
        objects
    }

    #[test]
    fn test_transform_is_expanded() {
        let objects = registry();
        let conn = Connection::new(ObjectId(1), ObjectId(0))
            .with_slices(Some(Slice::new(1, 3).unwrap()), None)
            .with_transform(Transform::Scalar(2.0));
        let ic = IntermediateConnection::from_connection(&conn, &objects).unwrap();
        assert_eq!(ic.width, 2);
        assert_eq!(ic.transform.values(), &array![[0.0, 2.0, 0.0], [0.0, 0.0, 2.0]]);
        assert!(ic.eval_points.is_none());
    }

    #[test]
    fn test_function_transform_reads_function_output() {
        let objects = registry();
        let product = FunctionRef::new("product", 1, |x| vec![x[0] * x[1]]);
        let conn = Connection::new(ObjectId(0), ObjectId(1))
            .with_function(product)
            .with_slices(None, Some(Slice::single(2).unwrap()));
        let ic = IntermediateConnection::from_connection(&conn, &objects).unwrap();
        assert_eq!(ic.transform.shape(), (3, 1));

        let outgoing = ic.get_reduced_outgoing_connection().unwrap();
        match outgoing.source {
            ReducedSource::Ensemble { evaluated_function, .. } => {
                assert_eq!(evaluated_function.values(), &array![[0.0], [-0.5], [-0.0]]);
            }
            other => panic!("expected ensemble source, got {:?}", other),
        }
    }

    #[test]
    fn test_unsliced_ensemble_samples_are_eval_points() {
        let objects = registry();
        let conn = Connection::new(ObjectId(0), ObjectId(1))
            .with_slices(Some(Slice::single(1).unwrap()), Some(Slice::single(0).unwrap()));
        let outgoing = IntermediateConnection::from_connection(&conn, &objects)
            .unwrap()
            .get_reduced_outgoing_connection()
            .unwrap();
        match outgoing.source {
            ReducedSource::Ensemble { evaluated_function, .. } => {
                assert_eq!(evaluated_function.values(), &array![[0.0], [1.0], [-1.0]]);
            }
            other => panic!("expected ensemble source, got {:?}", other),
        }
    }

    #[test]
    fn test_eval_points_must_match_pre_size() {
        let objects = registry();
        let conn = Connection::new(ObjectId(0), ObjectId(1))
            .with_slices(None, Some(Slice::new(0, 2).unwrap()))
            .with_eval_points(array![[0.1], [0.2]]);
        assert!(matches!(
            IntermediateConnection::from_connection(&conn, &objects),
            Err(ConnectivityError::InvalidConnection(_))
        ));
    }

    #[test]
    fn test_unsupported_constructs() {
        let objects = registry();
        let alpha = Connection::new(ObjectId(1), ObjectId(1)).with_synapse(Some(Synapse::Alpha { tau: 0.01 }));
        assert!(matches!(
            IntermediateConnection::from_connection(&alpha, &objects),
            Err(ConnectivityError::UnsupportedConstruct(_))
        ));

        let bcm = Connection::new(ObjectId(0), ObjectId(1))
            .with_slices(None, Some(Slice::new(0, 2).unwrap()))
            .with_learning_rule(LearningRule::Unsupported("BCM".to_string()));
        assert!(matches!(
            IntermediateConnection::from_connection(&bcm, &objects),
            Err(ConnectivityError::UnsupportedConstruct(_))
        ));
    }

    #[test]
    fn test_incoming_connection() {
        let objects = registry();
        let conn = Connection::new(ObjectId(1), ObjectId(1)).with_synapse(None).non_accumulatory();
        let incoming = IntermediateConnection::from_connection(&conn, &objects)
            .unwrap()
            .get_reduced_incoming_connection()
            .unwrap();
        assert_eq!(incoming.target.object, ObjectId(1));
        assert_eq!(incoming.target.slice, Slice::new(0, 3).unwrap());
        assert_eq!(incoming.target.port, Port::StandardInput);
        assert_eq!(
            incoming.filter,
            FilterParameter::Lowpass {
                tau: 0.0,
                is_accumulatory: false
            }
        );
    }

    #[test]
    fn test_global_inhibition() {
        let objects = registry();
        let conn = Connection::new(ObjectId(0), ObjectId(2))
            .with_transform(Transform::Dense(Array2::from_elem((4, 2), -3.0)));
        let ic = IntermediateConnection::from_connection(&conn, &objects)
            .unwrap()
            .into_global_inhibition()
            .unwrap();
        assert_eq!(ic.width, 1);
        assert_eq!(ic.transform.values(), &array![[-3.0, -3.0]]);
        assert_eq!(ic.get_reduced_incoming_connection().unwrap().target.port, Port::GlobalInhibition);
    }

    #[test]
    fn test_global_inhibition_rejects_non_uniform() {
        let objects = registry();
        let mut weights = Array2::from_elem((4, 2), -3.0);
        weights[[0, 0]] = 1.0;
        let conn = Connection::new(ObjectId(0), ObjectId(2)).with_transform(Transform::Dense(weights));
        let ic = IntermediateConnection::from_connection(&conn, &objects).unwrap();
        assert!(matches!(
            ic.into_global_inhibition(),
            Err(ConnectivityError::UnsupportedConstruct(_))
        ));
    }
}
