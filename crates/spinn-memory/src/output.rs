// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Device memory allocation and the files the loader writes.

Every placed core gets an application pointer table followed by its
regions. Blocks are allocated downward from the top of each node's free
memory. All allocations are checked before any file is written, so a
failed plan leaves nothing behind.
*/

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{MemoryError, MemoryResult};
use crate::region::Subregion;

/// Words of the pointer table before the region offsets
const POINTER_TABLE_HEADER_WORDS: usize = 4;

/// A core's rendered regions. `None` entries keep their index in the
/// pointer table without occupying memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSubvertex {
    pub x: u32,
    pub y: u32,
    pub p: u32,
    pub subregions: Vec<Option<Subregion>>,
    pub timer_period: u32,
}

/// Leading words of every application pointer table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerTableHeader {
    pub magic_number: u32,
    pub version: u32,
}

impl Default for PointerTableHeader {
    fn default() -> Self {
        PointerTableHeader {
            magic_number: 0xAD13_0AD6,
            version: 0x0001_0000,
        }
    }
}

/// Copy the file at `path` to `base_address` on node `(x, y)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionWrite {
    pub x: u32,
    pub y: u32,
    pub base_address: u32,
    pub size_bytes: u32,
    pub path: PathBuf,
}

/// Write `value` to the `n_bytes` at `address` on node `(x, y)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterWrite {
    pub x: u32,
    pub y: u32,
    pub address: u32,
    pub n_bytes: u32,
    pub value: u32,
}

/// Everything the device loader needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadPlan {
    pub register_writes: Vec<RegisterWrite>,
    pub region_writes: Vec<RegionWrite>,
}

impl LoadPlan {
    pub fn save_manifest(&self, path: &Path) -> MemoryResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| MemoryError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load_manifest(path: &Path) -> MemoryResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| MemoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Byte offset of each subregion from the first one
pub fn get_region_offsets(subregions: &[Option<Subregion>]) -> Vec<u32> {
    subregions
        .iter()
        .scan(0u32, |offset, subregion| {
            let start = *offset;
            *offset += subregion.as_ref().map_or(0, |sr| sr.size_bytes() as u32);
            Some(start)
        })
        .collect()
}

/// The table a core reads to find its regions: header words, then the
/// byte offset of each region counted from the start of the table.
pub fn create_app_pointer_table_region(
    subregions: &[Option<Subregion>],
    header: PointerTableHeader,
    timer_period: u32,
) -> Subregion {
    let table_bytes = ((POINTER_TABLE_HEADER_WORDS + subregions.len()) * 4) as u32;
    let mut words = vec![header.magic_number, header.version, timer_period, 0];
    words.extend(
        get_region_offsets(subregions)
            .into_iter()
            .map(|offset| offset + table_bytes),
    );
    Subregion::from_words(&words)
}

pub fn get_total_bytes_used(subregions: &[Option<Subregion>]) -> u64 {
    subregions
        .iter()
        .flatten()
        .map(|sr| sr.size_bytes() as u64)
        .sum()
}

/// Write each filled subregion to its own file and describe where it goes.
///
/// Unfilled subregions are not written but still advance the address.
pub fn write_core_region_files(
    x: u32,
    y: u32,
    p: u32,
    subregions: &[Option<Subregion>],
    base_address: u32,
    output_dir: &Path,
) -> MemoryResult<Vec<RegionWrite>> {
    let mut writes = Vec::new();
    let mut address = base_address;

    for (i, subregion) in subregions.iter().enumerate() {
        let Some(subregion) = subregion else {
            continue;
        };

        if !subregion.unfilled() {
            let path = output_dir.join(format!("{:03}_{:03}_{:02}_{:03}.bin", x, y, p, i));
            fs::write(&path, subregion.data()).map_err(|source| MemoryError::Io {
                path: path.display().to_string(),
                source,
            })?;
            debug!(target: "spinn-memory", "Writing {}", path.display());
            writes.push(RegionWrite {
                x,
                y,
                base_address: address,
                size_bytes: subregion.size_bytes() as u32,
                path,
            });
        }

        address = address.wrapping_add(subregion.size_bytes() as u32);
    }

    Ok(writes)
}

/// Allocates node memory for placed cores and produces their load plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGenerator {
    /// Free bytes per node
    pub memory_per_node: u64,
    /// Address of the first byte of free memory
    pub base_address: u32,
    pub header: PointerTableHeader,
}

struct CoreAllocation<'a> {
    placed: &'a PlacedSubvertex,
    regions: Vec<Option<Subregion>>,
    base_address: u32,
}

impl OutputGenerator {
    pub fn new(memory_per_node: u64, base_address: u32) -> Self {
        OutputGenerator {
            memory_per_node,
            base_address,
            header: PointerTableHeader::default(),
        }
    }

    pub fn with_header(mut self, header: PointerTableHeader) -> Self {
        self.header = header;
        self
    }

    /// Lay out every placement, then write the region files into
    /// `output_dir`. `register_address_lookup(x, y, p)` gives the register
    /// that receives each core's pointer table address.
    pub fn generate<F>(&self, placed: &[PlacedSubvertex], register_address_lookup: F, output_dir: &Path) -> MemoryResult<LoadPlan>
    where
        F: Fn(u32, u32, u32) -> u32,
    {
        let allocations = self.allocate(placed)?;

        fs::create_dir_all(output_dir).map_err(|source| MemoryError::Io {
            path: output_dir.display().to_string(),
            source,
        })?;

        let mut plan = LoadPlan::default();
        for allocation in &allocations {
            let core = allocation.placed;
            plan.region_writes.extend(write_core_region_files(
                core.x,
                core.y,
                core.p,
                &allocation.regions,
                allocation.base_address,
                output_dir,
            )?);
            plan.register_writes.push(RegisterWrite {
                x: core.x,
                y: core.y,
                address: register_address_lookup(core.x, core.y, core.p),
                n_bytes: 4,
                value: allocation.base_address,
            });
        }

        info!(
            target: "spinn-memory",
            "Generated {} region writes for {} cores in {}",
            plan.region_writes.len(),
            plan.register_writes.len(),
            output_dir.display()
        );
        Ok(plan)
    }

    fn allocate<'a>(&self, placed: &'a [PlacedSubvertex]) -> MemoryResult<Vec<CoreAllocation<'a>>> {
        let mut sorted: Vec<&PlacedSubvertex> = placed.iter().collect();
        sorted.sort_by_key(|core| (core.x, core.y, core.p));

        let mut free_memory: AHashMap<(u32, u32), u64> = AHashMap::new();
        let mut allocations = Vec::with_capacity(sorted.len());

        for core in sorted {
            let mut regions = vec![Some(create_app_pointer_table_region(
                &core.subregions,
                self.header,
                core.timer_period,
            ))];
            regions.extend(core.subregions.iter().cloned());

            let requested = get_total_bytes_used(&regions);
            let memory = free_memory.entry((core.x, core.y)).or_insert(self.memory_per_node);
            if requested > *memory {
                return Err(MemoryError::InsufficientMemory {
                    requested,
                    available: *memory,
                });
            }
            *memory -= requested;

            let address = *memory + u64::from(self.base_address);
            let base_address = u32::try_from(address).map_err(|_| {
                MemoryError::InvalidRegion(format!(
                    "core ({}, {}, {}) would start at {:#x}, beyond the 32-bit address space",
                    core.x, core.y, core.p, address
                ))
            })?;
            debug!(
                target: "spinn-memory",
                "Core ({}, {}, {}) uses {}B at {:#010x}",
                core.x,
                core.y,
                core.p,
                requested,
                base_address
            );

            allocations.push(CoreAllocation {
                placed: core,
                regions,
                base_address,
            });
        }

        Ok(allocations)
    }
}

/// Allocate with the standard pointer table header and return
/// `(register_writes, region_writes)`.
pub fn generate_data_for_placements<F>(
    placed: &[PlacedSubvertex],
    memory_per_node: u64,
    base_address: u32,
    register_address_lookup: F,
    output_dir: &Path,
) -> MemoryResult<(Vec<RegisterWrite>, Vec<RegionWrite>)>
where
    F: Fn(u32, u32, u32) -> u32,
{
    let plan = OutputGenerator::new(memory_per_node, base_address).generate(placed, register_address_lookup, output_dir)?;
    Ok((plan.register_writes, plan.region_writes))
}
