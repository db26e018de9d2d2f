// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Vertices which filter and transform values but compute nothing else.

A filter vertex occupies one core. Its regions, in pointer table order:

| # | Region          | Contents |
|---|-----------------|----------|
| 0 | system          | `size_in, n_output_keys, timer_period, transmission_delay, interpacket_pause` |
| 1 | output keys     | one routing key per transmitted value, sub-vertex filled in |
| 2 | filters         | `n_filters`, then `decay, 1 - decay, accumulator mask, width` per filter |
| 3 | filter routing  | `n_routes`, then `key, mask, filter index` per incoming stream |
| 4 | transform       | `n_rows, n_cols`, then the stacked outgoing transforms |
*/

use indexmap::IndexMap;
use ndarray::{concatenate, Array2, ArrayView2, Axis};
use spinn_connectivity::{ConnectivityError, FilterParameter, Port};
use spinn_keyspace::{Keyspace, FILTER_ROUTING_TAG, SUBVERTEX_FIELD};
use spinn_memory::{KeysRegion, ListRegion, MatrixPartitioning, MatrixPrepend, MatrixRegion, MemoryError, WordFormatter};
use spinn_structures::{NetworkObject, ObjectId};
use tracing::debug;

use crate::assembler::{get_keyspaces_with_dimensions, AssemblyContext, VertexAssembler};
use crate::error::{SpinnError, SpinnResult};
use crate::vertex::RegionedVertex;

/// Assembles [`ObjectKind::Filter`](spinn_structures::ObjectKind::Filter)
/// objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueFilterAssembler {
    /// Timesteps between transmitting successive streams of packets
    pub transmission_delay: u32,
    /// Microseconds between packets
    pub interpacket_pause: u32,
}

impl Default for ValueFilterAssembler {
    fn default() -> Self {
        ValueFilterAssembler {
            transmission_delay: 1,
            interpacket_pause: 1,
        }
    }
}

impl VertexAssembler for ValueFilterAssembler {
    fn assemble(&self, object: &NetworkObject, context: &AssemblyContext<'_>) -> SpinnResult<Option<RegionedVertex>> {
        let outgoing = context.outgoing(object.id);
        let output_keys = get_keyspaces_with_dimensions(object.id, outgoing.keys())?;

        let transforms: Vec<ArrayView2<'_, f64>> = outgoing
            .keys()
            .map(|c| {
                if c.source.function().is_some() {
                    return Err(ConnectivityError::UnsupportedConstruct(format!(
                        "function on connection from filter '{}'",
                        object.label
                    )));
                }
                if c.transform.n_cols() != object.size_in {
                    return Err(ConnectivityError::InvalidConnection(format!(
                        "transform from filter '{}' has {} columns, expected {}",
                        object.label,
                        c.transform.n_cols(),
                        object.size_in
                    )));
                }
                Ok(c.transform.values().view())
            })
            .collect::<Result<_, _>>()?;
        let transform = if transforms.is_empty() {
            Array2::zeros((0, object.size_in))
        } else {
            concatenate(Axis(0), &transforms).map_err(|e| MemoryError::InvalidRegion(e.to_string()))?
        };

        let mut incoming = context.incoming(object.id);
        let streams = incoming.shift_remove(&Port::StandardInput).unwrap_or_default();
        if let Some(port) = incoming.keys().next() {
            return Err(ConnectivityError::UnsupportedConstruct(format!(
                "filter '{}' cannot receive on {:?}",
                object.label, port
            ))
            .into());
        }

        let filters = filter_words(&streams, context, object.size_in);
        let routes = filter_routing_words(&streams, object.id)?;

        debug!(
            target: "spinn",
            "Filter '{}': {} output keys, {} filters, {} routes",
            object.label,
            output_keys.len(),
            streams.len(),
            (routes.len() - 1) / 3
        );

        let system = ListRegion::from_words(&[
            object.size_in as u32,
            output_keys.len() as u32,
            context.config.application.timer_period,
            self.transmission_delay,
            self.interpacket_pause,
        ]);

        let vertex = RegionedVertex::new(object.id, object.label.clone(), 1)
            .with_region(system)
            .with_region(KeysRegion::new(output_keys).with_fill_in_field(SUBVERTEX_FIELD))
            .with_region(ListRegion::from_words(&filters))
            .with_region(ListRegion::from_words(&routes))
            .with_region(
                MatrixRegion::new(transform, MatrixPartitioning::None, context.formatter)
                    .with_prepends(&[MatrixPrepend::NRows, MatrixPrepend::NColumns]),
            );
        Ok(Some(vertex))
    }
}

fn filter_words(
    streams: &IndexMap<FilterParameter, Vec<Option<Keyspace>>>,
    context: &AssemblyContext<'_>,
    width: usize,
) -> Vec<u32> {
    let fixed = match context.formatter {
        WordFormatter::FixedPoint(_) => context.formatter,
        _ => WordFormatter::default(),
    };
    let mut words = vec![streams.len() as u32];
    for filter in streams.keys() {
        let FilterParameter::Lowpass { tau, is_accumulatory } = *filter;
        let decay = if tau > 0.0 { (-context.dt() / tau).exp() } else { 0.0 };
        words.extend([
            fixed.format(decay),
            fixed.format(1.0 - decay),
            if is_accumulatory { u32::MAX } else { 0 },
            width as u32,
        ]);
    }
    words
}

fn filter_routing_words(
    streams: &IndexMap<FilterParameter, Vec<Option<Keyspace>>>,
    object: ObjectId,
) -> SpinnResult<Vec<u32>> {
    let mut routes = Vec::new();
    for (index, keyspaces) in streams.values().enumerate() {
        for keyspace in keyspaces {
            let keyspace = keyspace.as_ref().ok_or(SpinnError::UnkeyedConnection { object })?;
            let key = keyspace.get_key(Some(FILTER_ROUTING_TAG))?;
            let mask = keyspace.get_mask(Some(FILTER_ROUTING_TAG))?;
            routes.push((key, mask, index as u32));
        }
    }

    let mut words = vec![routes.len() as u32];
    for (key, mask, index) in routes {
        for value in [key, mask] {
            words.push(u32::try_from(value).map_err(|_| MemoryError::KeyTooWide {
                key: value,
                keyspace: format!("filter routing of {}", object),
            })?);
        }
        words.push(index);
    }
    Ok(words)
}
