// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The compilation pipeline.

A [`CompilationContext`] is built once per compilation. It owns the
configuration, the ordered list of network transforms and the assembler
registered for each object kind. Compiling runs in two steps:

1. [`CompilationContext::compile`] reduces connections into a connection
   tree, applies the network transforms and the default keyspace,
   assembles one vertex per object, partitions the vertices and splits the
   edges between them.
2. Once the placement layer has chosen a core for every split vertex,
   [`CompilationContext::generate`] renders each core's regions and lays
   them out in device memory.
*/

use indexmap::IndexMap;
use spinn_config::{validate_config, SpinnConfig};
use spinn_connectivity::{Connection, ConnectionTree, Edge, IntermediateConnection, Port};
use spinn_keyspace::Keyspace;
use spinn_memory::{LoadPlan, OutputGenerator, PlacedSubvertex, PointerTableHeader, WordFormatter};
use spinn_partitioning::{
    get_split_edges, get_split_vertices, partition_vertices, Constraint, PartitionError, Partitions, SplitEdge,
    SplitVertex, SplitVertices,
};
use spinn_structures::{FixedPointFormat, ObjectId, ObjectKind, ObjectRegistry};
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::assembler::{AssemblyContext, VertexAssembler};
use crate::error::{SpinnError, SpinnResult};
use crate::vertex::RegionedVertex;

/// Name of the load manifest written beside the region files
pub const MANIFEST_FILE_NAME: &str = "load_manifest.json";

type TransformFn = dyn Fn(&ConnectionTree, &ObjectRegistry) -> SpinnResult<ConnectionTree> + Send + Sync;

/// A rewrite of the connection tree applied before keyspaces are assigned.
#[derive(Clone)]
pub struct NetworkTransform {
    name: String,
    apply: Arc<TransformFn>,
}

impl NetworkTransform {
    pub fn new<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&ConnectionTree, &ObjectRegistry) -> SpinnResult<ConnectionTree> + Send + Sync + 'static,
    {
        NetworkTransform {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    /// Substitute objects at either end of every connection
    pub fn replace_objects(
        name: impl Into<String>,
        replacements: IndexMap<ObjectId, ObjectId>,
        replace_when_originating: bool,
        replace_when_terminating: bool,
    ) -> Self {
        Self::new(name, move |tree, _| {
            Ok(tree.get_new_tree_with_replaced_objects(
                &replacements,
                replace_when_originating,
                replace_when_terminating,
            ))
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, tree: &ConnectionTree, objects: &ObjectRegistry) -> SpinnResult<ConnectionTree> {
        (self.apply)(tree, objects)
    }
}

impl Debug for NetworkTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "NetworkTransform({})", self.name)
    }
}

/// The core chosen for a split vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub p: u32,
    pub split_vertex: SplitVertex,
}

/// Everything the placement layer needs, and what output generation reads
/// back.
#[derive(Debug, Clone)]
pub struct CompiledNetwork {
    pub tree: ConnectionTree,
    pub vertices: IndexMap<ObjectId, RegionedVertex>,
    pub partitions: Partitions,
    pub split_vertices: SplitVertices,
    pub split_edges: Vec<(Edge, Vec<SplitEdge>)>,
}

impl CompiledNetwork {
    pub fn get_vertex(&self, id: ObjectId) -> Option<&RegionedVertex> {
        self.vertices.get(&id)
    }

    /// Position of `split_vertex` among the splits of its vertex
    pub fn subvertex_index(&self, split_vertex: &SplitVertex) -> Option<usize> {
        self.split_vertices
            .get(&split_vertex.vertex)?
            .iter()
            .position(|s| s == split_vertex)
    }

    pub fn iter_split_vertices(&self) -> impl Iterator<Item = &SplitVertex> {
        self.split_vertices.values().flatten()
    }
}

pub struct CompilationContext {
    config: SpinnConfig,
    network_transforms: Vec<NetworkTransform>,
    assemblers: IndexMap<ObjectKind, Arc<dyn VertexAssembler>>,
    constraints: Vec<Constraint>,
}

impl CompilationContext {
    /// Context with no transforms or assemblers; fails if `config` is
    /// invalid
    pub fn new(config: SpinnConfig) -> SpinnResult<Self> {
        validate_config(&config)?;
        Ok(CompilationContext {
            config,
            network_transforms: Vec::new(),
            assemblers: IndexMap::new(),
            constraints: Vec::new(),
        })
    }

    /// Transforms run in the order they are added
    pub fn with_network_transform(mut self, transform: NetworkTransform) -> Self {
        self.network_transforms.push(transform);
        self
    }

    /// Replaces any assembler already registered for `kind`
    pub fn with_assembler(mut self, kind: ObjectKind, assembler: impl VertexAssembler + 'static) -> Self {
        self.assemblers.insert(kind, Arc::new(assembler));
        self
    }

    /// Constraint checked in addition to the machine budgets
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn config(&self) -> &SpinnConfig {
        &self.config
    }

    pub fn network_transforms(&self) -> &[NetworkTransform] {
        &self.network_transforms
    }

    pub fn word_formatter(&self) -> SpinnResult<WordFormatter> {
        let fp = &self.config.fixed_point;
        Ok(WordFormatter::FixedPoint(FixedPointFormat::new(fp.n_bits, fp.n_frac, fp.signed)?))
    }

    pub fn default_keyspace(&self) -> SpinnResult<Keyspace> {
        let ks = &self.config.keyspace;
        Ok(Keyspace::connection_default(ks.width, ks.subvertex_bits, ks.dimension_bits)?)
    }

    /// Machine budgets scaled by the usage fraction, then any added
    /// constraints
    pub fn constraints(&self) -> Vec<Constraint> {
        let machine = &self.config.machine;
        let mut constraints = vec![
            Constraint::max_cpu(u64::from(machine.cpu_cycles_per_tick), machine.usage_fraction),
            Constraint::max_dtcm(u64::from(machine.dtcm_per_core), machine.usage_fraction),
            Constraint::max_sdram(u64::from(machine.sdram_per_node), machine.usage_fraction),
        ];
        constraints.extend(self.constraints.iter().cloned());
        constraints
    }

    pub fn pointer_table_header(&self) -> PointerTableHeader {
        PointerTableHeader {
            magic_number: self.config.application.magic_number,
            version: self.config.application.version,
        }
    }

    /// Reduce, transform, key, assemble and partition a network.
    pub fn compile(&self, objects: &ObjectRegistry, connections: &[Connection]) -> SpinnResult<CompiledNetwork> {
        self.compile_network(objects, connections).map_err(|e| {
            error!(target: "spinn", "Compilation failed: {}", e);
            e
        })
    }

    fn compile_network(&self, objects: &ObjectRegistry, connections: &[Connection]) -> SpinnResult<CompiledNetwork> {
        let intermediate = self.reduce_connections(objects, connections)?;
        let mut tree = ConnectionTree::from_intermediate_connections(&intermediate)?;

        for transform in &self.network_transforms {
            tree = transform.apply(&tree, objects)?;
            debug!(target: "spinn", "Applied network transform '{}'", transform.name());
        }

        let tree = tree.get_new_tree_with_applied_keyspace(&self.default_keyspace()?)?;
        let vertices = self.assemble_vertices(objects, &tree)?;

        let vertex_list: Vec<RegionedVertex> = vertices.values().cloned().collect();
        let partitions = partition_vertices(&vertex_list, &self.constraints())?;
        let split_vertices = get_split_vertices(&partitions);

        let edges: Vec<Edge> = tree
            .get_folded_edges()
            .into_iter()
            .filter(|edge| {
                let placed = vertices.contains_key(&edge.pre) && vertices.contains_key(&edge.post);
                if !placed {
                    debug!(
                        target: "spinn",
                        "Skipping edge {} -> {}: an end has no vertex",
                        edge.pre,
                        edge.post
                    );
                }
                placed
            })
            .collect();
        let split_edges = get_split_edges(&edges, &split_vertices)?;

        info!(
            target: "spinn",
            "Compiled {} objects into {} vertices, {} split vertices and {} split edges",
            objects.len(),
            vertices.len(),
            split_vertices.values().map(Vec::len).sum::<usize>(),
            split_edges.iter().map(|(_, s)| s.len()).sum::<usize>()
        );

        Ok(CompiledNetwork {
            tree,
            vertices,
            partitions,
            split_vertices,
            split_edges,
        })
    }

    /// Expand every connection; connections to the global inhibition port
    /// are collapsed to a single row.
    pub fn reduce_connections(
        &self,
        objects: &ObjectRegistry,
        connections: &[Connection],
    ) -> SpinnResult<Vec<IntermediateConnection>> {
        connections
            .iter()
            .map(|connection| -> SpinnResult<IntermediateConnection> {
                let ic = IntermediateConnection::from_connection(connection, objects)?;
                if ic.target_port == Port::GlobalInhibition {
                    Ok(ic.into_global_inhibition()?)
                } else {
                    Ok(ic)
                }
            })
            .collect()
    }

    fn assemble_vertices(
        &self,
        objects: &ObjectRegistry,
        tree: &ConnectionTree,
    ) -> SpinnResult<IndexMap<ObjectId, RegionedVertex>> {
        let context = AssemblyContext {
            tree,
            config: &self.config,
            formatter: self.word_formatter()?,
        };

        let mut vertices = IndexMap::new();
        for object in objects.iter() {
            let assembler = self
                .assemblers
                .get(&object.kind)
                .ok_or_else(|| SpinnError::UnsupportedObjectKind {
                    kind: object.kind,
                    label: object.label.clone(),
                })?;
            match assembler.assemble(object, &context)? {
                Some(vertex) => {
                    debug!(target: "spinn", "Assembled {} with {} regions", object, vertex.n_regions());
                    vertices.insert(object.id, vertex);
                }
                None => debug!(target: "spinn", "{} needs no vertex", object),
            }
        }
        Ok(vertices)
    }

    /// Render every placed split vertex into the configured output
    /// directory.
    pub fn generate<F>(
        &self,
        compiled: &CompiledNetwork,
        placements: &[Placement],
        register_address_lookup: F,
    ) -> SpinnResult<LoadPlan>
    where
        F: Fn(u32, u32, u32) -> u32,
    {
        let output_dir = self.config.output.directory.clone();
        self.generate_into(compiled, placements, register_address_lookup, &output_dir)
    }

    pub fn generate_into<F>(
        &self,
        compiled: &CompiledNetwork,
        placements: &[Placement],
        register_address_lookup: F,
        output_dir: &Path,
    ) -> SpinnResult<LoadPlan>
    where
        F: Fn(u32, u32, u32) -> u32,
    {
        self.generate_load_plan(compiled, placements, register_address_lookup, output_dir)
            .map_err(|e| {
                error!(target: "spinn", "Output generation failed: {}", e);
                e
            })
    }

    fn generate_load_plan<F>(
        &self,
        compiled: &CompiledNetwork,
        placements: &[Placement],
        register_address_lookup: F,
        output_dir: &Path,
    ) -> SpinnResult<LoadPlan>
    where
        F: Fn(u32, u32, u32) -> u32,
    {
        let placed = self.render_placements(compiled, placements)?;

        let machine = &self.config.machine;
        let plan = OutputGenerator::new(u64::from(machine.sdram_per_node), machine.sdram_base_address)
            .with_header(self.pointer_table_header())
            .generate(&placed, register_address_lookup, output_dir)?;

        if self.config.output.write_manifest {
            plan.save_manifest(&output_dir.join(MANIFEST_FILE_NAME))?;
        }
        Ok(plan)
    }

    fn render_placements(&self, compiled: &CompiledNetwork, placements: &[Placement]) -> SpinnResult<Vec<PlacedSubvertex>> {
        let mut cores = HashSet::new();
        let mut placed_split_vertices = HashSet::new();

        placements
            .iter()
            .map(|placement| -> SpinnResult<PlacedSubvertex> {
                let split = placement.split_vertex;
                if !cores.insert((placement.x, placement.y, placement.p)) {
                    return Err(SpinnError::InvalidPlacement(format!(
                        "core ({}, {}, {}) is used more than once",
                        placement.x, placement.y, placement.p
                    )));
                }
                if !placed_split_vertices.insert(split) {
                    return Err(SpinnError::InvalidPlacement(format!("{} is placed more than once", split)));
                }

                let vertex = compiled
                    .get_vertex(split.vertex)
                    .ok_or(PartitionError::UnknownVertex(split.vertex))?;
                let index = compiled
                    .subvertex_index(&split)
                    .ok_or_else(|| SpinnError::InvalidPlacement(format!("{} is not a partition of its vertex", split)))?;

                Ok(PlacedSubvertex {
                    x: placement.x,
                    y: placement.y,
                    p: placement.p,
                    subregions: vertex.render(split.slice, index)?,
                    timer_period: self.config.application.timer_period,
                })
            })
            .collect()
    }
}

impl Debug for CompilationContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationContext")
            .field("config", &self.config)
            .field("network_transforms", &self.network_transforms)
            .field("assemblers", &self.assemblers.keys().collect::<Vec<_>>())
            .field("constraints", &self.constraints)
            .finish()
    }
}
