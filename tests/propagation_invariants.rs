//! Propagation Invariant Tests
//!
//! - A second pass over an unchanged store writes nothing
//! - Weak fields only fill blanks
//! - Values reach every depth, parent before child
//! - Cycles abort the pass, wherever they sit
//! - Propagated values survive reopening a file store

use samplecat::hierarchy::{HierarchyErrorCode, PropagationOptions, Propagator};
use samplecat::schema::{FieldRegistry, CRUISE_NUMBER, STATION_NAME};
use samplecat::storage::{EventRecord, EventStore, FileStore, MemoryStore, StoreLayout};
use samplecat::validator::CellValue;
use tempfile::TempDir;
use uuid::Uuid;

// =============================================================================
// Test Utilities
// =============================================================================

fn registry() -> FieldRegistry {
    FieldRegistry::builtin().unwrap()
}

fn add(store: &mut impl EventStore, parent: Option<Uuid>) -> Uuid {
    let id = Uuid::new_v4();
    store.put(EventRecord::new(id, parent).unwrap()).unwrap();
    id
}

/// root -> a -> (a1, a2), root -> b
fn family(store: &mut impl EventStore) -> [Uuid; 5] {
    let root = add(store, None);
    let a = add(store, Some(root));
    let b = add(store, Some(root));
    let a1 = add(store, Some(a));
    let a2 = add(store, Some(a));
    [root, a, b, a1, a2]
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_second_pass_changes_nothing() {
    let registry = registry();
    let mut store = MemoryStore::default();
    let [root, a, ..] = family(&mut store);
    store.set_value(&root, CRUISE_NUMBER, CellValue::Int(2018707)).unwrap();
    store.set_value(&root, STATION_NAME, "P1".into()).unwrap();
    store.set_value(&a, "sampleDepthInMeters", CellValue::Int(20)).unwrap();
    store.set_value(&root, "pi_name", "Root PI".into()).unwrap();

    let propagator = Propagator::new(&registry);
    let first = propagator.run(&mut store).unwrap();
    assert!(first.writes > 0);

    let snapshot = store.records().unwrap();
    let second = propagator.run(&mut store).unwrap();
    assert_eq!(second.writes, 0);
    assert!(second.is_fixed_point());
    assert_eq!(store.records().unwrap(), snapshot, "second pass must not touch any record");
}

// =============================================================================
// Weak inheritance
// =============================================================================

#[test]
fn test_weak_field_keeps_child_value() {
    let registry = registry();
    let mut store = MemoryStore::default();
    let parent = add(&mut store, None);
    let child = add(&mut store, Some(parent));
    store.set_value(&parent, "pi_name", "X".into()).unwrap();
    store.set_value(&child, "pi_name", "Y".into()).unwrap();

    let report = Propagator::new(&registry).run(&mut store).unwrap();
    assert_eq!(report.weak_skips, 1);
    assert_eq!(store.get_value(&child, "pi_name").unwrap(), CellValue::from("Y"));
}

#[test]
fn test_weak_field_fills_empty_child() {
    let registry = registry();
    let mut store = MemoryStore::default();
    let parent = add(&mut store, None);
    let child = add(&mut store, Some(parent));
    store.set_value(&parent, "pi_name", "X".into()).unwrap();

    Propagator::new(&registry).run(&mut store).unwrap();
    assert_eq!(store.get_value(&child, "pi_name").unwrap(), CellValue::from("X"));
}

#[test]
fn test_weak_value_relayed_by_intermediate() {
    // The intermediate keeps its own depth and hands that down, not the root's
    let registry = registry();
    let mut store = MemoryStore::default();
    let [root, a, b, a1, _] = family(&mut store);
    store.set_value(&root, "sampleDepthInMeters", CellValue::Int(5)).unwrap();
    store.set_value(&a, "sampleDepthInMeters", CellValue::Int(50)).unwrap();

    Propagator::new(&registry).run(&mut store).unwrap();
    assert_eq!(store.get_value(&a1, "sampleDepthInMeters").unwrap(), CellValue::Int(50));
    assert_eq!(store.get_value(&b, "sampleDepthInMeters").unwrap(), CellValue::Int(5));
}

// =============================================================================
// Reach
// =============================================================================

#[test]
fn test_every_descendant_receives_root_values() {
    let registry = registry();
    let mut store = MemoryStore::default();
    let ids = family(&mut store);
    store.set_value(&ids[0], CRUISE_NUMBER, CellValue::Int(2018707)).unwrap();

    Propagator::new(&registry).run(&mut store).unwrap();
    for id in &ids[1..] {
        assert_eq!(store.get_value(id, CRUISE_NUMBER).unwrap(), CellValue::Int(2018707));
    }
}

#[test]
fn test_deep_chain_does_not_exhaust_the_stack() {
    let registry = registry();
    let mut store = MemoryStore::default();
    let root = add(&mut store, None);
    let mut last = root;
    for _ in 0..5_000 {
        last = add(&mut store, Some(last));
    }
    store.set_value(&root, STATION_NAME, "Deep".into()).unwrap();

    let report = Propagator::new(&registry).run(&mut store).unwrap();
    assert_eq!(report.children, 5_000);
    assert_eq!(store.get_value(&last, STATION_NAME).unwrap(), CellValue::from("Deep"));
}

#[test]
fn test_non_native_inheritable_fields_use_other() {
    let registry = registry();
    let mut store = MemoryStore::new(StoreLayout::new(["stationName"]));
    let root = add(&mut store, None);
    let child = add(&mut store, Some(root));
    store.set_value(&root, CRUISE_NUMBER, CellValue::Int(2018707)).unwrap();

    Propagator::new(&registry).run(&mut store).unwrap();
    let record = store.require(&child).unwrap();
    assert_eq!(record.other.get(CRUISE_NUMBER).map(String::as_str), Some("2018707"));
    assert!(record.fields.is_empty());
}

#[test]
fn test_dangling_subtrees_are_left_alone() {
    let registry = registry();
    let mut store = MemoryStore::default();
    let orphan = add(&mut store, Some(Uuid::new_v4()));
    let orphan_child = add(&mut store, Some(orphan));
    store.set_value(&orphan, STATION_NAME, "Lost".into()).unwrap();

    let report = Propagator::new(&registry).run(&mut store).unwrap();
    assert_eq!(report.detached, 2);
    assert!(store.get_value(&orphan_child, STATION_NAME).unwrap().is_blank());
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn test_two_event_cycle_fails_fast() {
    let registry = registry();
    let mut store = MemoryStore::default();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    store.put(EventRecord::new(a, Some(b)).unwrap()).unwrap();
    store.put(EventRecord::new(b, Some(a)).unwrap()).unwrap();

    let err = Propagator::new(&registry).run(&mut store).unwrap_err();
    assert_eq!(err.code(), HierarchyErrorCode::Cycle);
    assert!(err.is_fatal());
}

#[test]
fn test_cycle_below_a_root_fails() {
    let registry = registry();
    let mut store = MemoryStore::default();
    let root = add(&mut store, None);
    let x = Uuid::new_v4();
    let y = Uuid::new_v4();
    let z = Uuid::new_v4();
    store.put(EventRecord::new(x, Some(z)).unwrap()).unwrap();
    store.put(EventRecord::new(y, Some(x)).unwrap()).unwrap();
    store.put(EventRecord::new(z, Some(y)).unwrap()).unwrap();
    store.set_value(&root, STATION_NAME, "P1".into()).unwrap();

    let err = Propagator::new(&registry).run(&mut store).unwrap_err();
    assert_eq!(err.code(), HierarchyErrorCode::Cycle);
    for id in [x, y, z] {
        assert!(err.to_string().contains(&id.to_string()));
    }
}

// =============================================================================
// Durability
// =============================================================================

#[test]
fn test_propagation_persists_in_file_store() {
    let temp = TempDir::new().unwrap();
    let registry = registry();
    let (root, child) = {
        let mut store = FileStore::open(temp.path(), StoreLayout::default()).unwrap();
        let root = add(&mut store, None);
        let child = add(&mut store, Some(root));
        let updated = store
            .require(&root)
            .unwrap()
            .with_field(STATION_NAME, "P4")
            .with_metadata("title", "JC1");
        store.put(updated).unwrap();
        Propagator::with_options(&registry, PropagationOptions { include_metadata: true })
            .run(&mut store)
            .unwrap();
        (root, child)
    };

    let mut store = FileStore::open(temp.path(), StoreLayout::default()).unwrap();
    assert_eq!(store.get_value(&child, STATION_NAME).unwrap(), CellValue::from("P4"));
    assert_eq!(store.get_metadata(&child).unwrap().get("title").map(String::as_str), Some("JC1"));
    assert!(store.contains(&root).unwrap());

    let frames = store.frame_count();
    Propagator::new(&registry).run(&mut store).unwrap();
    assert_eq!(store.frame_count(), frames, "fixed point must not append frames");
}
