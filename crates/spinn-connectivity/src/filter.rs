// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synapses and the receive-side filters they reduce to.

use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

use crate::error::{ConnectivityError, ConnectivityResult};
use crate::reduced::IncomingReducedConnection;

/// Synapse model on a front-end connection
#[derive(Debug, Clone, PartialEq)]
pub enum Synapse {
    Lowpass { tau: f64 },
    Alpha { tau: f64 },
    LinearFilter { num: Vec<f64>, den: Vec<f64> },
}

/// Filter applied by the receiving core
#[derive(Debug, Clone, Copy)]
pub enum FilterParameter {
    Lowpass { tau: f64, is_accumulatory: bool },
}

impl FilterParameter {
    /// Map a synapse to a filter; no synapse is a zero time-constant lowpass
    pub fn from_synapse(synapse: Option<&Synapse>, is_accumulatory: bool) -> ConnectivityResult<Self> {
        match synapse {
            None => Ok(FilterParameter::Lowpass {
                tau: 0.0,
                is_accumulatory,
            }),
            Some(Synapse::Lowpass { tau }) => Ok(FilterParameter::Lowpass {
                tau: *tau,
                is_accumulatory,
            }),
            Some(other) => Err(ConnectivityError::UnsupportedConstruct(format!(
                "synapse {:?} has no filter implementation",
                other
            ))),
        }
    }

    pub fn is_accumulatory(&self) -> bool {
        match self {
            FilterParameter::Lowpass { is_accumulatory, .. } => *is_accumulatory,
        }
    }

    fn tau_bits(tau: f64) -> u64 {
        if tau == 0.0 {
            0
        } else {
            tau.to_bits()
        }
    }
}

impl PartialEq for FilterParameter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                FilterParameter::Lowpass { tau: a, is_accumulatory: acc_a },
                FilterParameter::Lowpass { tau: b, is_accumulatory: acc_b },
            ) => Self::tau_bits(*a) == Self::tau_bits(*b) && acc_a == acc_b,
        }
    }
}

impl Eq for FilterParameter {}

impl Hash for FilterParameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            FilterParameter::Lowpass { tau, is_accumulatory } => {
                0u8.hash(state);
                Self::tau_bits(*tau).hash(state);
                is_accumulatory.hash(state);
            }
        }
    }
}

/// Smallest set of filters needed to receive `connections`, in order of
/// first use, and the index into that set for each connection.
pub fn combine_filters(connections: &[IncomingReducedConnection]) -> (Vec<FilterParameter>, Vec<usize>) {
    let mut filters: IndexMap<FilterParameter, ()> = IndexMap::new();
    let indices = connections
        .iter()
        .map(|c| filters.insert_full(c.filter, ()).0)
        .collect();
    (filters.into_keys().collect(), indices)
}
