//! Storage interface used by the propagator, the repair tools and the
//! insert path.
//!
//! Implementors provide record-level `get`/`put`/`records`; the field-level
//! operations are derived from those. A single `put` is atomic; nothing
//! spans several records.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::schema::{CRUISE_NUMBER, SAMPLE_TYPE};
use crate::validator::CellValue;

use super::errors::{StorageError, StorageResult};
use super::record::EventRecord;

/// Columns stored as native attributes of the original event table
const DEFAULT_NATIVE: &[&str] = &[
    "cruiseNumber",
    "cruiseName",
    "stationName",
    "eventTime",
    "eventDate",
    "decimalLatitude",
    "decimalLongitude",
    "sampleType",
    "gearType",
    "sampleDepthInMeters",
    "bottomDepthInMeters",
    "bottleNumber",
    "samplingProtocol",
    "sampleLocation",
    "pi_name",
    "pi_email",
    "pi_institution",
    "recordedBy",
    "eventRemarks",
];

/// Which field names are native record attributes; the rest live in `other`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    native: BTreeSet<String>,
}

impl StoreLayout {
    pub fn new<I, S>(native: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            native: native.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_native(&self, field: &str) -> bool {
        self.native.contains(field)
    }

    pub fn native(&self) -> impl Iterator<Item = &str> {
        self.native.iter().map(String::as_str)
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::new(DEFAULT_NATIVE.iter().copied())
    }
}

/// A parent id referenced by at least one record but matching none
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DanglingReference {
    pub parent_event_id: Uuid,
    /// One child pointing at the missing parent
    pub example_child: Uuid,
    pub child_count: usize,
    pub sample_type: Option<String>,
    pub cruise_number: Option<String>,
    pub source: Option<String>,
}

fn non_blank(value: &CellValue) -> Option<String> {
    if value.is_blank() {
        None
    } else {
        Some(value.as_text())
    }
}

/// Record store
pub trait EventStore {
    fn layout(&self) -> &StoreLayout;

    fn get(&self, event_id: &Uuid) -> StorageResult<Option<EventRecord>>;

    /// Insert or replace a record
    fn put(&mut self, record: EventRecord) -> StorageResult<()>;

    /// All records, ordered by event id
    fn records(&self) -> StorageResult<Vec<EventRecord>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, event_id: &Uuid) -> StorageResult<bool> {
        Ok(self.get(event_id)?.is_some())
    }

    /// Like `get`, failing with `UnknownEvent`
    fn require(&self, event_id: &Uuid) -> StorageResult<EventRecord> {
        self.get(event_id)?
            .ok_or_else(|| StorageError::unknown_event(event_id))
    }

    /// Value of a field, reading native attributes or the `other` map
    fn get_value(&self, event_id: &Uuid, field: &str) -> StorageResult<CellValue> {
        let record = self.require(event_id)?;
        if self.layout().is_native(field) {
            Ok(record.field(field).clone())
        } else {
            Ok(record
                .other
                .get(field)
                .map(|v| CellValue::text(v.as_str()))
                .unwrap_or_default())
        }
    }

    /// Writes a field value, returning whether anything changed.
    ///
    /// Unchanged values are not written and do not bump `modified`.
    fn set_value(&mut self, event_id: &Uuid, field: &str, value: CellValue) -> StorageResult<bool> {
        let mut record = self.require(event_id)?;
        if self.layout().is_native(field) {
            if record.field(field) == &value || (record.field(field).is_blank() && value.is_blank()) {
                return Ok(false);
            }
            record.set_field(field, value);
        } else {
            let text = if value.is_blank() { String::new() } else { value.as_text() };
            if record.other.get(field).map(String::as_str).unwrap_or("") == text {
                return Ok(false);
            }
            record.set_other(field, &text);
        }
        record.touch();
        self.put(record)?;
        Ok(true)
    }

    fn get_metadata(&self, event_id: &Uuid) -> StorageResult<BTreeMap<String, String>> {
        Ok(self.require(event_id)?.metadata)
    }

    /// Replaces the metadata block, returning whether anything changed
    fn set_metadata(&mut self, event_id: &Uuid, metadata: BTreeMap<String, String>) -> StorageResult<bool> {
        let mut record = self.require(event_id)?;
        if record.metadata == metadata {
            return Ok(false);
        }
        record.metadata = metadata;
        record.touch();
        self.put(record)?;
        Ok(true)
    }

    fn children_of(&self, event_id: &Uuid) -> StorageResult<Vec<Uuid>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.parent_event_id.as_ref() == Some(event_id))
            .map(|r| r.event_id)
            .collect())
    }

    fn roots_without_parent(&self) -> StorageResult<Vec<Uuid>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.parent_event_id.is_none())
            .map(|r| r.event_id)
            .collect())
    }

    /// The whole `(eventId, parentEventId)` relation
    fn parent_links(&self) -> StorageResult<Vec<(Uuid, Option<Uuid>)>> {
        Ok(self
            .records()?
            .into_iter()
            .map(|r| (r.event_id, r.parent_event_id))
            .collect())
    }

    /// Parent ids that match no record, with context for locating the children
    fn find_dangling_parent_references(&self) -> StorageResult<Vec<DanglingReference>> {
        let records = self.records()?;
        let ids: HashSet<Uuid> = records.iter().map(|r| r.event_id).collect();

        let mut dangling: BTreeMap<Uuid, DanglingReference> = BTreeMap::new();
        for record in &records {
            let Some(parent) = record.parent_event_id else {
                continue;
            };
            if ids.contains(&parent) {
                continue;
            }
            dangling
                .entry(parent)
                .and_modify(|d| d.child_count += 1)
                .or_insert_with(|| DanglingReference {
                    parent_event_id: parent,
                    example_child: record.event_id,
                    child_count: 1,
                    sample_type: non_blank(record.field(SAMPLE_TYPE)),
                    cruise_number: non_blank(record.field(CRUISE_NUMBER)),
                    source: record.source.clone(),
                });
        }

        Ok(dangling.into_values().collect())
    }
}
