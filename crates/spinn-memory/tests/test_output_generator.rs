// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Output generation against a temporary directory

use byteorder::{ByteOrder, LittleEndian};
use spinn_memory::{
    generate_data_for_placements, write_core_region_files, LoadPlan, MemoryError, OutputGenerator, PlacedSubvertex,
    Subregion,
};
use std::fs;
use tempfile::TempDir;

fn read_words(path: &std::path::Path) -> Vec<u32> {
    let bytes = fs::read(path).unwrap();
    let mut words = vec![0u32; bytes.len() / 4];
    LittleEndian::read_u32_into(&bytes, &mut words);
    words
}

fn placed(x: u32, y: u32, p: u32, subregions: Vec<Option<Subregion>>) -> PlacedSubvertex {
    PlacedSubvertex {
        x,
        y,
        p,
        subregions,
        timer_period: 1000,
    }
}

fn user0(x: u32, y: u32, p: u32) -> u32 {
    0xE500_0000 + ((x * 256 + y) * 18 + p) * 0x100
}

// ============================================================================
// Region files
// ============================================================================

#[test]
fn test_write_core_region_files() {
    let dir = TempDir::new().unwrap();
    let subregions = vec![
        Some(Subregion::from_words(&[1, 2, 3])),
        Some(Subregion::from_words(&[4])),
        Some(Subregion::from_words(&[5, 6])),
    ];
    let writes = write_core_region_files(0, 1, 1, &subregions, 0xABCD, dir.path()).unwrap();

    assert_eq!(writes.len(), 3);
    assert!(writes.iter().all(|w| w.x == 0 && w.y == 1));
    assert_eq!(
        writes.iter().map(|w| w.size_bytes).collect::<Vec<_>>(),
        vec![12, 4, 8]
    );
    assert_eq!(
        writes.iter().map(|w| w.base_address).collect::<Vec<_>>(),
        vec![0xABCD, 0xABCD + 12, 0xABCD + 16]
    );
    assert_eq!(writes[0].path, dir.path().join("000_001_01_000.bin"));
    assert_eq!(read_words(&writes[2].path), vec![5, 6]);
}

#[test]
fn test_unfilled_regions_are_skipped_but_take_space() {
    let dir = TempDir::new().unwrap();
    let subregions = vec![
        Some(Subregion::from_words(&[1, 2, 3])),
        Some(Subregion::reserved(1)),
        None,
        Some(Subregion::from_words(&[5, 6])),
    ];
    let writes = write_core_region_files(0, 1, 1, &subregions, 0xABCD, dir.path()).unwrap();

    assert_eq!(writes.len(), 2);
    assert_eq!(writes[1].base_address, 0xABCD + (3 + 1) * 4);
    assert_eq!(writes[1].path, dir.path().join("000_001_01_003.bin"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

// ============================================================================
// Placement layout
// ============================================================================

#[test]
fn test_cores_allocated_downward_per_node() {
    let dir = TempDir::new().unwrap();
    let cores = vec![
        placed(0, 0, 2, vec![Some(Subregion::from_words(&[9; 4]))]),
        placed(0, 0, 1, vec![Some(Subregion::from_words(&[7; 10])), Some(Subregion::reserved(6))]),
        placed(1, 0, 1, vec![Some(Subregion::from_words(&[8; 2]))]),
    ];
    let (registers, regions) =
        generate_data_for_placements(&cores, 1024, 0x6000_0000, user0, dir.path()).unwrap();

    // Sorted by (x, y, p): core 1 takes the top of node (0, 0)
    // table (4 + 2 words) + 10 + 6 words = 88 bytes
    assert_eq!(registers.len(), 3);
    assert_eq!(registers[0].value, 0x6000_0000 + 1024 - 88);
    assert_eq!(registers[0].address, user0(0, 0, 1));
    assert_eq!(registers[0].n_bytes, 4);
    // table (4 + 1 words) + 4 words = 36 bytes, below the first core
    assert_eq!(registers[1].value, 0x6000_0000 + 1024 - 88 - 36);
    // Node (1, 0) starts again from the top
    assert_eq!(registers[2].value, 0x6000_0000 + 1024 - 28);

    // Pointer table, one filled region, no file for the reserved block
    let first_core: Vec<_> = regions.iter().filter(|w| w.path.to_string_lossy().contains("000_000_01")).collect();
    assert_eq!(first_core.len(), 2);
    let table = read_words(&first_core[0].path);
    assert_eq!(table, vec![0xAD13_0AD6, 0x0001_0000, 1000, 0, 24, 64]);
    assert_eq!(first_core[1].base_address, registers[0].value + 24);
}

#[test]
fn test_insufficient_memory_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let cores = vec![
        placed(0, 0, 1, vec![Some(Subregion::from_words(&[1; 8]))]),
        placed(0, 0, 2, vec![Some(Subregion::reserved(100))]),
    ];

    match generate_data_for_placements(&cores, 200, 0, user0, &out) {
        Err(MemoryError::InsufficientMemory { requested, available }) => {
            assert_eq!(requested, (5 + 100) * 4);
            assert_eq!(available, 200 - (5 + 8) * 4);
        }
        other => panic!("expected insufficient memory, got {:?}", other),
    }
    assert!(!out.exists());
}

#[test]
fn test_generator_header_and_manifest() {
    let dir = TempDir::new().unwrap();
    let generator = OutputGenerator::new(4096, 0x6000_0000).with_header(spinn_memory::PointerTableHeader {
        magic_number: 0x1234_5678,
        version: 2,
    });
    let cores = vec![placed(2, 3, 4, vec![Some(Subregion::from_words(&[1]))])];
    let plan = generator.generate(&cores, user0, dir.path()).unwrap();
    assert_eq!(read_words(&plan.region_writes[0].path)[..2], [0x1234_5678, 2]);

    let manifest = dir.path().join("load_plan.json");
    plan.save_manifest(&manifest).unwrap();
    assert_eq!(LoadPlan::load_manifest(&manifest).unwrap(), plan);
}
