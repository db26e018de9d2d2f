// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use spinn_keyspace::{FieldSpec, Keyspace, KeyspaceError};

// ===== Field definitions =====

#[test]
fn test_fields_must_fit_width() {
    let ks = Keyspace::new(64).unwrap();
    for spec in [
        FieldSpec::new("out_of_range").start_at(64),
        FieldSpec::new("out_of_range").start_at(128),
        FieldSpec::new("out_of_range").length(2).start_at(63),
        FieldSpec::new("out_of_range").length(2).start_at(128),
        FieldSpec::new("zero_length").length(0).start_at(0),
        FieldSpec::new("huge").length(u32::MAX).start_at(1),
        FieldSpec::new("huge").length(u32::MAX - 1).start_at(u32::MAX),
    ] {
        assert!(matches!(ks.add_field(spec), Err(KeyspaceError::FieldConflict(_))));
    }
}

#[test]
fn test_overlapping_fixed_fields_rejected() {
    let ks = Keyspace::new(64).unwrap();
    ks.add_field(FieldSpec::new("obstruction").length(8).start_at(8)).unwrap();

    for (length, start_at) in [(8, 8), (16, 0), (12, 0), (16, 8), (12, 12), (4, 10)] {
        let result = ks.add_field(FieldSpec::new("obstructed").length(length).start_at(start_at));
        assert!(result.is_err(), "{} bits at {} should collide", length, start_at);
    }

    // Duplicate names are rejected even without a collision
    assert!(ks.add_field(FieldSpec::new("obstruction").length(1).start_at(0)).is_err());

    // Adjacent is fine
    ks.add_field(FieldSpec::new("below").length(8).start_at(0)).unwrap();
    ks.add_field(FieldSpec::new("above").length(8).start_at(16)).unwrap();
}

#[test]
fn test_auto_length_field_counts_as_one_bit() {
    let ks = Keyspace::new(8).unwrap();
    ks.add_field(FieldSpec::new("never").start_at(0)).unwrap();
    assert!(ks.add_field(FieldSpec::new("obstructed").start_at(0)).is_err());
    ks.add_field(FieldSpec::new("neighbour").start_at(1)).unwrap();
}

#[test]
fn test_parent_fields_collide_with_conditional_children() {
    let ks = Keyspace::new(8).unwrap();
    ks.add_field(FieldSpec::new("split").length(1).start_at(7)).unwrap();
    ks.bind([("split", 0)])
        .unwrap()
        .add_field(FieldSpec::new("child").length(4).start_at(0))
        .unwrap();

    // The child exists whenever split == 0, so an unconditional field may
    // not share its bits
    assert!(ks.add_field(FieldSpec::new("global").length(2).start_at(2)).is_err());
    ks.add_field(FieldSpec::new("global").length(2).start_at(4)).unwrap();
}

// ===== Masks and keys =====

#[test]
fn test_masks_by_tag() {
    let ks = Keyspace::new(64).unwrap();
    ks.add_field(FieldSpec::new("bottom").length(32).start_at(0).tags("Bottom Both")).unwrap();
    ks.add_field(FieldSpec::new("top").length(8).start_at(56).tags("Top Both")).unwrap();

    assert_eq!(ks.get_mask(None).unwrap(), 0xFF00_0000_FFFF_FFFF);
    assert_eq!(ks.get_mask(Some("Both")).unwrap(), 0xFF00_0000_FFFF_FFFF);
    assert_eq!(ks.get_mask(Some("Bottom")).unwrap(), 0x0000_0000_FFFF_FFFF);
    assert_eq!(ks.get_mask(Some("Top")).unwrap(), 0xFF00_0000_0000_0000);
    assert!(matches!(ks.get_mask(Some("Nope")), Err(KeyspaceError::UnknownTag(_))));
}

#[test]
fn test_keys_require_bound_fields() {
    let ks = Keyspace::new(32).unwrap();
    ks.add_field(FieldSpec::new("a").length(8).start_at(0).tags("A All")).unwrap();
    ks.add_field(FieldSpec::new("b").length(8).start_at(8).tags("B All")).unwrap();
    ks.add_field(FieldSpec::new("c").length(8).start_at(16).tags("C All")).unwrap();

    assert!(matches!(ks.bind([("d", 123)]), Err(KeyspaceError::Binding(_))));
    for tag in [None, Some("All"), Some("A"), Some("B"), Some("C")] {
        assert!(matches!(ks.get_key(tag), Err(KeyspaceError::Incomplete { .. })));
    }

    let ks_a = ks.bind([("a", 0xAA)]).unwrap();
    assert_eq!(ks_a.get_key(Some("A")).unwrap(), 0x0000_00AA);
    match ks_a.get_key(None) {
        Err(KeyspaceError::Incomplete { missing }) => {
            assert_eq!(missing, vec!["b".to_string(), "c".to_string()]);
        }
        other => panic!("expected Incomplete, got {:?}", other),
    }

    let ks_abc = ks_a.bind([("b", 0xBB), ("c", 0xCC)]).unwrap();
    assert_eq!(ks_abc.get_key(None).unwrap(), 0x00CC_BBAA);
    assert_eq!(ks_abc.get_key(Some("All")).unwrap(), 0x00CC_BBAA);
    assert_eq!(ks_abc.get_key(Some("B")).unwrap(), 0x0000_BB00);
    assert_eq!(ks_abc.get_key(Some("C")).unwrap(), 0x00CC_0000);
    assert_eq!(ks_abc.get_field_key("b").unwrap(), 0x0000_BB00);

    assert_eq!(ks.bind([("a", 0)]).unwrap().get_key(Some("A")).unwrap(), 0);
    assert_eq!(ks.bind([("a", 0xFF)]).unwrap().get_key(Some("A")).unwrap(), 0xFF);
}

#[test]
fn test_failed_render_does_not_freeze() {
    let ks = Keyspace::new(32).unwrap();
    ks.add_field(FieldSpec::new("a").length(8).start_at(0)).unwrap();

    assert!(matches!(ks.get_key(None), Err(KeyspaceError::Incomplete { .. })));
    assert!(matches!(ks.get_mask(Some("Nope")), Err(KeyspaceError::UnknownTag(_))));
    assert!(!ks.is_frozen());
    ks.add_field(FieldSpec::new("b").length(8).start_at(8)).unwrap();

    assert_eq!(ks.get_mask(None).unwrap(), 0xFFFF);
    assert!(ks.is_frozen());
    assert!(ks.add_field(FieldSpec::new("c").length(8).start_at(16)).is_err());
}

// ===== Hierarchy =====

#[test]
fn test_hierarchy() {
    let ks = Keyspace::new(8).unwrap();
    ks.add_field(FieldSpec::new("always").length(1).start_at(7)).unwrap();
    ks.add_field(FieldSpec::new("split").length(1).start_at(6)).unwrap();

    let ks_s0 = ks.bind([("split", 0)]).unwrap();
    ks_s0.add_field(FieldSpec::new("s0_btm").length(3).start_at(0)).unwrap();
    ks_s0.add_field(FieldSpec::new("s0_top").length(3).start_at(3)).unwrap();

    let ks_s1 = ks.bind([("split", 1)]).unwrap();
    ks_s1.add_field(FieldSpec::new("s1_btm").length(3).start_at(0)).unwrap();
    ks_s1.add_field(FieldSpec::new("s1_top").length(3).start_at(3)).unwrap();

    for child in ["s0_top", "s0_btm", "s1_top", "s1_btm"] {
        assert!(matches!(ks.get(child), Err(KeyspaceError::FieldUnavailable { .. })));
    }

    // Child bindings may be listed before the parent they depend on
    let defined = ks
        .bind([("s0_btm", 3), ("s0_top", 5), ("always", 1), ("split", 0)])
        .unwrap();
    assert_eq!(defined.get("always").unwrap(), Some(1));
    assert_eq!(defined.get("s0_top").unwrap(), Some(5));
    assert!(defined.get("s1_btm").is_err());

    let selected = ks.bind([("split", 1)]).unwrap();
    assert_eq!(selected.get("always").unwrap(), None);
    assert_eq!(selected.get("s1_btm").unwrap(), None);
    assert!(selected.get("s0_btm").is_err());

    // Children cannot be bound without their parent
    assert!(matches!(
        ks.bind([("s0_btm", 3), ("s0_top", 5)]),
        Err(KeyspaceError::Binding(_))
    ));

    assert_eq!(defined.get_key(None).unwrap(), 0b1010_1011);
    assert_eq!(defined.get_mask(None).unwrap(), 0b1111_1111);
}

// ===== Automatic sizing and placement =====

#[test]
fn test_auto_length_grows_with_bindings_then_fixes() {
    let once = Keyspace::new(8).unwrap();
    once.add_field(FieldSpec::new("once").start_at(0)).unwrap();
    assert_eq!(once.bind([("once", 0x0F)]).unwrap().get_key(None).unwrap(), 0x0F);
    assert_eq!(once.get_mask(None).unwrap(), 0x0F);

    let never = Keyspace::new(8).unwrap();
    never.add_field(FieldSpec::new("never").start_at(0)).unwrap();
    assert_eq!(never.get_mask(None).unwrap(), 0x01);
    assert!(never.bind([("never", 1)]).is_ok());
    assert!(never.bind([("never", 2)]).is_err());

    let ks = Keyspace::new(64).unwrap();
    ks.add_field(FieldSpec::new("auto_length").start_at(32)).unwrap();
    for value in [0, 1, 0xDEAD_BEEF, 0x1234] {
        assert_eq!(ks.bind([("auto_length", value)]).unwrap().get("auto_length").unwrap(), Some(value));
    }
    assert_eq!(ks.get_mask(None).unwrap(), 0xFFFF_FFFF_0000_0000);
    assert!(ks.bind([("auto_length", 0x1_0000_0000)]).is_err());
}

#[test]
fn test_auto_length_that_does_not_fit() {
    let ks = Keyspace::new(16).unwrap();
    ks.add_field(FieldSpec::new("too_long").start_at(0)).unwrap();
    assert_eq!(ks.bind([("too_long", 0x10000)]).unwrap().get("too_long").unwrap(), Some(0x10000));
    assert!(matches!(ks.get_mask(None), Err(KeyspaceError::FieldConflict(_))));
}

#[test]
fn test_sizing_one_branch_leaves_the_other_open() {
    let ks = Keyspace::new(16).unwrap();
    ks.add_field(FieldSpec::new("split").start_at(8).tag("TopLevel")).unwrap();
    ks.bind([("split", 0)]).unwrap().add_field(FieldSpec::new("s0").start_at(0)).unwrap();
    ks.bind([("split", 2)]).unwrap().add_field(FieldSpec::new("s2").start_at(0)).unwrap();

    let s0 = ks.bind([("split", 0), ("s0", 0x10)]).unwrap();
    assert_eq!(s0.get_mask(None).unwrap(), 0x031F);
    assert_eq!(s0.get_key(None).unwrap(), 0x0010);

    assert!(ks.bind([("split", 0), ("s0", 0x3F)]).is_err());
    assert!(ks.bind([("split", 4)]).is_err());

    // s2 was never enabled, so it is still unsized
    assert_eq!(ks.bind([("split", 2), ("s2", 0x3F)]).unwrap().get("s2").unwrap(), Some(0x3F));
    assert_eq!(ks.get_mask(Some("TopLevel")).unwrap(), 0x0300);
    assert!(ks.bind([("split", 2), ("s2", 0x7F)]).is_ok());
}

#[test]
fn test_auto_placement_in_insertion_order() {
    let ks = Keyspace::new(32).unwrap();
    ks.add_field(FieldSpec::new("a").length(4).tag("A")).unwrap();
    ks.add_field(FieldSpec::new("b").length(4).tag("B")).unwrap();
    ks.add_field(FieldSpec::new("c").length(4).tag("C")).unwrap();
    ks.add_field(FieldSpec::new("full_obstruction").length(4).start_at(12)).unwrap();
    ks.add_field(FieldSpec::new("d").length(4).tag("D")).unwrap();
    ks.add_field(FieldSpec::new("partial_obstruction").length(4).start_at(22)).unwrap();
    ks.add_field(FieldSpec::new("e").length(4).tag("E")).unwrap();
    ks.add_field(FieldSpec::new("f").length(2).tag("F")).unwrap();

    // Requested out of order, placed in definition order
    assert_eq!(ks.get_mask(Some("C")).unwrap(), 0x0000_0F00);
    assert_eq!(ks.get_mask(Some("B")).unwrap(), 0x0000_00F0);
    assert_eq!(ks.get_mask(Some("A")).unwrap(), 0x0000_000F);
    assert_eq!(ks.get_mask(Some("D")).unwrap(), 0x000F_0000);
    // e cannot use the 2-bit gap at 20-21, f can
    assert_eq!(ks.get_mask(Some("E")).unwrap(), 0x3C00_0000);
    assert_eq!(ks.get_mask(Some("F")).unwrap(), 0x0030_0000);
}

#[test]
fn test_auto_placement_uses_top_bits() {
    let ks = Keyspace::new(8).unwrap();
    ks.add_field(FieldSpec::new("low").length(4).start_at(0)).unwrap();
    ks.add_field(FieldSpec::new("high").length(4)).unwrap();
    assert_eq!(ks.get_field_mask("high").unwrap(), 0xF0);
}

#[test]
fn test_auto_placement_overflow() {
    let ks = Keyspace::new(8).unwrap();
    ks.add_field(FieldSpec::new("a").length(6)).unwrap();
    ks.add_field(FieldSpec::new("last_straw").length(4)).unwrap();
    assert!(matches!(ks.get_mask(None), Err(KeyspaceError::FieldConflict(_))));
}

#[test]
fn test_key_with_tag_only_places_tagged_fields() {
    let ks = Keyspace::new(16).unwrap();
    ks.add_field(FieldSpec::new("untagged").length(4)).unwrap();
    ks.add_field(FieldSpec::new("tagged").length(4).tag("T")).unwrap();

    let bound = ks.bind([("tagged", 3)]).unwrap();
    assert_eq!(bound.get_key(Some("T")).unwrap(), 3);
    assert_eq!(ks.field("untagged").unwrap().start_at, None);
    assert_eq!(ks.get_field_mask("untagged").unwrap(), 0x00F0);
}

// ===== Properties =====

proptest! {
    #[test]
    fn packed_key_round_trips_field_values(
        widths in prop::collection::vec(1u32..=8, 1..6),
        seed in any::<u64>(),
    ) {
        let ks = Keyspace::new(64).unwrap();
        for (n, width) in widths.iter().enumerate() {
            ks.add_field(FieldSpec::new(format!("f{}", n)).length(*width)).unwrap();
        }
        let values: Vec<(String, u64)> = widths
            .iter()
            .enumerate()
            .map(|(n, width)| (format!("f{}", n), (seed >> (n * 8)) & ((1u64 << width) - 1)))
            .collect();
        let bound = ks.bind(values.clone()).unwrap();
        let key = bound.get_key(None).unwrap();

        for (name, value) in values {
            let field = ks.field(&name).unwrap();
            let start = field.start_at.unwrap();
            let length = field.length.unwrap();
            prop_assert_eq!((key >> start) & ((1u64 << length) - 1), value);
        }
        prop_assert_eq!(key & !bound.get_mask(None).unwrap(), 0);
    }
}
