//! Storage Integrity Tests
//!
//! - Corruption in the event log is never ignored
//! - Replay restores the latest state of every event
//! - Unchanged writes append nothing
//! - Compaction keeps state and drops superseded frames
//! - A record can never name itself as parent

use samplecat::storage::{
    log_path, EventRecord, EventStore, FileStore, LogReader, StorageErrorCode, StoreLayout,
};
use samplecat::validator::CellValue;
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

// =============================================================================
// Test Utilities
// =============================================================================

fn create_temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

fn open(dir: &TempDir) -> FileStore {
    FileStore::open(dir.path(), StoreLayout::default()).unwrap()
}

// =============================================================================
// Corruption
// =============================================================================

/// A flipped byte inside a frame must stop the store from opening.
#[test]
fn test_corruption_causes_explicit_failure() {
    let temp_dir = create_temp_data_dir();
    {
        let mut store = open(&temp_dir);
        store
            .put(EventRecord::new(Uuid::new_v4(), None).unwrap().with_field("stationName", "P1"))
            .unwrap();
    }

    let path = log_path(temp_dir.path());
    let mut contents = fs::read(&path).unwrap();
    let mid = contents.len() / 2;
    contents[mid] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let err = FileStore::open(temp_dir.path(), StoreLayout::default())
        .err()
        .expect("corrupt log must not open");
    assert_eq!(err.code(), StorageErrorCode::DataCorruption);
    assert!(err.is_fatal());
    assert!(
        err.to_string().to_lowercase().contains("checksum"),
        "error should mention checksum, got: {}",
        err
    );
}

/// A torn final write is corruption too, not a silently shorter log.
#[test]
fn test_truncated_tail_is_detected() {
    let temp_dir = create_temp_data_dir();
    {
        let mut store = open(&temp_dir);
        for _ in 0..3 {
            store.put(EventRecord::new(Uuid::new_v4(), None).unwrap()).unwrap();
        }
    }

    let path = log_path(temp_dir.path());
    let contents = fs::read(&path).unwrap();
    fs::write(&path, &contents[..contents.len() - 5]).unwrap();

    let mut reader = LogReader::open(&path).unwrap();
    assert!(reader.read_next().unwrap().is_some());
    assert!(reader.read_next().unwrap().is_some());
    let err = reader.read_next().unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::DataCorruption);
}

// =============================================================================
// Replay
// =============================================================================

#[test]
fn test_replay_restores_latest_state() {
    let temp_dir = create_temp_data_dir();
    let parent = Uuid::new_v4();
    let child = Uuid::new_v4();
    {
        let mut store = open(&temp_dir);
        store.put(EventRecord::new(parent, None).unwrap()).unwrap();
        store
            .put(EventRecord::new(child, Some(parent)).unwrap().with_other("ctdFile", "a.cnv"))
            .unwrap();
        store.set_value(&child, "bottleNumber", CellValue::Int(3)).unwrap();
        store.set_value(&child, "ctdFile", "b.cnv".into()).unwrap();
    }

    let store = open(&temp_dir);
    assert_eq!(store.len(), 2);
    assert_eq!(store.frame_count(), 4);
    let record = store.require(&child).unwrap();
    assert_eq!(record.parent_event_id, Some(parent));
    assert_eq!(record.field("bottleNumber"), &CellValue::Int(3));
    assert_eq!(record.other.get("ctdFile").map(String::as_str), Some("b.cnv"));
    assert_eq!(store.children_of(&parent).unwrap(), vec![child]);
    assert_eq!(store.roots_without_parent().unwrap(), vec![parent]);
}

#[test]
fn test_unchanged_value_appends_nothing() {
    let temp_dir = create_temp_data_dir();
    let mut store = open(&temp_dir);
    let id = Uuid::new_v4();
    store.put(EventRecord::new(id, None).unwrap()).unwrap();

    assert!(store.set_value(&id, "stationName", "P1".into()).unwrap());
    let modified = store.require(&id).unwrap().modified;
    assert!(!store.set_value(&id, "stationName", "P1".into()).unwrap());
    assert!(!store.set_value(&id, "sampleType", CellValue::Empty).unwrap());

    assert_eq!(store.frame_count(), 2);
    assert_eq!(store.require(&id).unwrap().modified, modified);
}

#[test]
fn test_unknown_event_is_an_error() {
    let temp_dir = create_temp_data_dir();
    let mut store = open(&temp_dir);
    let err = store.set_value(&Uuid::new_v4(), "stationName", "P1".into()).unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::UnknownEvent);
    assert!(!err.is_fatal());
}

// =============================================================================
// Compaction
// =============================================================================

#[test]
fn test_compaction_keeps_state() {
    let temp_dir = create_temp_data_dir();
    let id = Uuid::new_v4();
    {
        let mut store = open(&temp_dir);
        store.put(EventRecord::new(id, None).unwrap()).unwrap();
        for station in ["P1", "P2", "P3"] {
            store.set_value(&id, "stationName", station.into()).unwrap();
        }
        let before = fs::metadata(store.path()).unwrap().len();
        store.compact().unwrap();
        assert_eq!(store.frame_count(), 1);
        assert!(fs::metadata(store.path()).unwrap().len() < before);

        // Writes after compaction land in the new log
        store.set_value(&id, "stationName", "P4".into()).unwrap();
    }

    let store = open(&temp_dir);
    assert_eq!(store.frame_count(), 2);
    assert_eq!(store.get_value(&id, "stationName").unwrap(), CellValue::from("P4"));
}

// =============================================================================
// Record invariants
// =============================================================================

#[test]
fn test_self_parent_never_stored() {
    let id = Uuid::new_v4();
    let err = EventRecord::new(id, Some(id)).unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::InvalidRecord);

    let temp_dir = create_temp_data_dir();
    let mut store = open(&temp_dir);
    let mut record = EventRecord::new(id, None).unwrap();
    record.parent_event_id = Some(id);
    assert!(store.put(record).is_err());
    assert_eq!(store.frame_count(), 0);
    assert!(store.is_empty());
}
