//! Hierarchy Repair Tools
//!
//! Diagnostics for broken parent links plus the operator clean-ups that go
//! with them.

use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};
use crate::storage::{DanglingReference, EventRecord, EventStore};
use crate::validator::CellValue;

use super::errors::{HierarchyError, HierarchyResult};
use super::tree::EventTree;

/// Every parent id that no record carries, with one example child each.
///
/// Read-only.
pub fn hanging_report<S: EventStore + ?Sized>(store: &S) -> HierarchyResult<Vec<DanglingReference>> {
    let report = store.find_dangling_parent_references()?;
    let children: usize = report.iter().map(|d| d.child_count).sum();
    log_event_with_fields(
        Event::DanglingScan,
        &[
            ("children", &children.to_string()),
            ("dangling", &report.len().to_string()),
        ],
    );
    Ok(report)
}

/// Parent ids from `event_id` up to its root, nearest first.
///
/// A dangling parent id ends the chain and is included.
pub fn ancestors<S: EventStore + ?Sized>(store: &S, event_id: &Uuid) -> HierarchyResult<Vec<Uuid>> {
    let tree = EventTree::build(store.parent_links()?)?;
    if !tree.contains(event_id) {
        return Err(HierarchyError::unknown_event(event_id));
    }
    tree.ancestors(event_id)
}

/// The event followed by its stored ancestors, nearest first
pub fn lineage<S: EventStore + ?Sized>(store: &S, event_id: &Uuid) -> HierarchyResult<Vec<EventRecord>> {
    let mut chain = vec![store.require(event_id)?];
    for id in ancestors(store, event_id)? {
        if let Some(record) = store.get(&id)? {
            chain.push(record);
        }
    }
    Ok(chain)
}

/// Replaces every exact occurrence of `from` in `field` with `to`.
///
/// Returns the number of records changed.
pub fn replace_values<S: EventStore + ?Sized>(
    store: &mut S,
    field: &str,
    from: &CellValue,
    to: &CellValue,
) -> HierarchyResult<usize> {
    let wanted = from.as_text();
    let mut changed = 0;
    for record in store.records()? {
        let current = store.get_value(&record.event_id, field)?;
        if current.is_blank() || current.as_text() != wanted {
            continue;
        }
        if store.set_value(&record.event_id, field, to.clone())? {
            changed += 1;
        }
    }
    log_event_with_fields(
        Event::ValuesReplaced,
        &[
            ("changed", &changed.to_string()),
            ("field", field),
            ("from", &wanted),
            ("to", &to.as_text()),
        ],
    );
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::HierarchyErrorCode;
    use crate::schema::STATION_NAME;
    use crate::storage::MemoryStore;

    fn insert(store: &mut MemoryStore, id: Uuid, parent: Option<Uuid>) {
        store.put(EventRecord::new(id, parent).unwrap()).unwrap();
    }

    #[test]
    fn test_hanging_report_groups_children() {
        let mut store = MemoryStore::default();
        let ghost = Uuid::new_v4();
        let (a, b, root) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        insert(&mut store, root, None);
        insert(&mut store, a, Some(ghost));
        insert(&mut store, b, Some(ghost));

        let report = hanging_report(&store).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].parent_event_id, ghost);
        assert_eq!(report[0].child_count, 2);
        assert!(report[0].example_child == a || report[0].example_child == b);
    }

    #[test]
    fn test_ancestors_and_lineage() {
        let mut store = MemoryStore::default();
        let (root, child, grandchild) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        insert(&mut store, root, None);
        insert(&mut store, child, Some(root));
        insert(&mut store, grandchild, Some(child));

        assert_eq!(ancestors(&store, &grandchild).unwrap(), vec![child, root]);
        let chain: Vec<Uuid> = lineage(&store, &grandchild).unwrap().iter().map(|r| r.event_id).collect();
        assert_eq!(chain, vec![grandchild, child, root]);
    }

    #[test]
    fn test_ancestors_of_unknown_event() {
        let store = MemoryStore::default();
        let err = ancestors(&store, &Uuid::new_v4()).unwrap_err();
        assert_eq!(err.code(), HierarchyErrorCode::UnknownEvent);
    }

    #[test]
    fn test_replace_values_exact_match_only() {
        let mut store = MemoryStore::default();
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            insert(&mut store, *id, None);
        }
        store.set_value(&ids[0], STATION_NAME, CellValue::from("P1 ")).unwrap();
        store.set_value(&ids[1], STATION_NAME, CellValue::from("P1")).unwrap();
        store.set_value(&ids[2], STATION_NAME, CellValue::from("P1b")).unwrap();

        let changed = replace_values(&mut store, STATION_NAME, &CellValue::from("P1"), &CellValue::from("NLEG01")).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(store.get_value(&ids[1], STATION_NAME).unwrap(), CellValue::from("NLEG01"));
        assert_eq!(store.get_value(&ids[2], STATION_NAME).unwrap(), CellValue::from("P1b"));
    }
}
