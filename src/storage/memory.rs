//! In-memory event store

use std::collections::BTreeMap;

use uuid::Uuid;

use super::errors::{StorageError, StorageResult};
use super::record::EventRecord;
use super::store::{EventStore, StoreLayout};

/// Event store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    layout: StoreLayout,
    records: BTreeMap<Uuid, EventRecord>,
}

impl MemoryStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self {
            layout,
            records: BTreeMap::new(),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.values()
    }
}

pub(crate) fn check_record(record: &EventRecord) -> StorageResult<()> {
    if record.parent_event_id == Some(record.event_id) {
        return Err(StorageError::invalid_record(
            record.event_id,
            "eventID equals parentEventID",
        ));
    }
    Ok(())
}

impl EventStore for MemoryStore {
    fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    fn get(&self, event_id: &Uuid) -> StorageResult<Option<EventRecord>> {
        Ok(self.records.get(event_id).cloned())
    }

    fn put(&mut self, record: EventRecord) -> StorageResult<()> {
        check_record(&record)?;
        self.records.insert(record.event_id, record);
        Ok(())
    }

    fn records(&self) -> StorageResult<Vec<EventRecord>> {
        Ok(self.records.values().cloned().collect())
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn contains(&self, event_id: &Uuid) -> StorageResult<bool> {
        Ok(self.records.contains_key(event_id))
    }

    fn parent_links(&self) -> StorageResult<Vec<(Uuid, Option<Uuid>)>> {
        Ok(self
            .records
            .values()
            .map(|r| (r.event_id, r.parent_event_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::CellValue;

    fn store_with_family() -> (MemoryStore, Uuid, Uuid) {
        let mut store = MemoryStore::default();
        let root = EventRecord::new(Uuid::new_v4(), None)
            .unwrap()
            .with_field("stationName", "P1");
        let child = EventRecord::new(Uuid::new_v4(), Some(root.event_id)).unwrap();
        let (r, c) = (root.event_id, child.event_id);
        store.put(root).unwrap();
        store.put(child).unwrap();
        (store, r, c)
    }

    #[test]
    fn test_hierarchy_queries() {
        let (store, root, child) = store_with_family();
        assert_eq!(store.roots_without_parent().unwrap(), vec![root]);
        assert_eq!(store.children_of(&root).unwrap(), vec![child]);
        assert!(store.children_of(&child).unwrap().is_empty());
    }

    #[test]
    fn test_native_and_other_values() {
        let (mut store, root, _) = store_with_family();
        assert_eq!(store.get_value(&root, "stationName").unwrap().as_text(), "P1");

        assert!(store.set_value(&root, "ctdCast", CellValue::text("12")).unwrap());
        let record = store.get(&root).unwrap().unwrap();
        assert_eq!(record.other.get("ctdCast").map(String::as_str), Some("12"));
        assert_eq!(store.get_value(&root, "ctdCast").unwrap().as_text(), "12");
    }

    #[test]
    fn test_unchanged_value_is_not_written() {
        let (mut store, root, _) = store_with_family();
        let before = store.get(&root).unwrap().unwrap().modified;
        assert!(!store.set_value(&root, "stationName", CellValue::text("P1")).unwrap());
        assert_eq!(store.get(&root).unwrap().unwrap().modified, before);
    }

    #[test]
    fn test_unknown_event() {
        let (mut store, _, _) = store_with_family();
        let err = store.set_value(&Uuid::new_v4(), "stationName", CellValue::text("x")).unwrap_err();
        assert_eq!(err.code(), crate::storage::StorageErrorCode::UnknownEvent);
    }

    #[test]
    fn test_dangling_references() {
        let (mut store, _, _) = store_with_family();
        let ghost = Uuid::new_v4();
        let orphan = EventRecord::new(Uuid::new_v4(), Some(ghost))
            .unwrap()
            .with_field("sampleType", "Water")
            .with_source("leg2.xlsx");
        let sibling = EventRecord::new(Uuid::new_v4(), Some(ghost)).unwrap();
        store.put(orphan).unwrap();
        store.put(sibling).unwrap();

        let dangling = store.find_dangling_parent_references().unwrap();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].parent_event_id, ghost);
        assert_eq!(dangling[0].child_count, 2);
    }
}
