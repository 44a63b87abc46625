//! Insert path
//!
//! Turns the rows of a checked submission into `EventRecord`s. New event ids
//! are inserted; existing ones are left alone unless update mode is on, in
//! which case the stored record is replaced but keeps its creation time and
//! history.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::checker::{PreparedRow, PreparedSheet};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{EVENT_ID, PARENT_EVENT_ID};
use crate::storage::{EventRecord, EventStore};
use crate::validator::{is_canonical_uuid, CellValue};

use super::errors::IngestResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped_existing: usize,
    pub skipped_invalid: usize,
}

impl ImportSummary {
    pub fn absorb(&mut self, other: &ImportSummary) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.skipped_existing += other.skipped_existing;
        self.skipped_invalid += other.skipped_invalid;
    }
}

fn parse_id(value: &CellValue) -> Option<Uuid> {
    let text = value.as_text();
    let text = text.trim();
    if is_canonical_uuid(text) {
        Uuid::try_parse(text).ok()
    } else {
        None
    }
}

pub struct Importer {
    update: bool,
}

impl Importer {
    pub fn new() -> Self {
        Self { update: false }
    }

    /// Replace existing records instead of skipping them
    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    pub fn import<S: EventStore + ?Sized>(&self, store: &mut S, sheet: &PreparedSheet) -> IngestResult<ImportSummary> {
        let source = sheet.source.clone().unwrap_or_else(|| "unknown source".to_string());
        let mut summary = ImportSummary::default();

        for row in &sheet.rows {
            let Some(mut record) = self.build(store, sheet, row, &source) else {
                summary.skipped_invalid += 1;
                log_event_with_fields(
                    Event::RowSkipped,
                    &[("row", &row.number.to_string()), ("source", &source)],
                );
                continue;
            };

            let id = record.event_id.to_string();
            match store.get(&record.event_id)? {
                Some(_) if !self.update => {
                    summary.skipped_existing += 1;
                    log_event_with_fields(Event::RecordExists, &[("event_id", &id)]);
                }
                Some(existing) => {
                    record.created = existing.created;
                    record.history = existing.history;
                    record.append_history(record.modified, format!("updated from {}", source));
                    store.put(record)?;
                    summary.updated += 1;
                    log_event_with_fields(Event::RecordUpdated, &[("event_id", &id)]);
                }
                None => {
                    record.append_history(record.created, format!("created from {}", source));
                    store.put(record)?;
                    summary.inserted += 1;
                    log_event_with_fields(Event::RecordInserted, &[("event_id", &id)]);
                }
            }
        }

        log_event_with_fields(
            Event::InsertComplete,
            &[
                ("inserted", &summary.inserted.to_string()),
                ("skipped_existing", &summary.skipped_existing.to_string()),
                ("skipped_invalid", &summary.skipped_invalid.to_string()),
                ("source", &source),
                ("updated", &summary.updated.to_string()),
            ],
        );
        Ok(summary)
    }

    /// Record for one row, `None` when the row has no usable identifiers
    fn build<S: EventStore + ?Sized>(
        &self,
        store: &S,
        sheet: &PreparedSheet,
        row: &PreparedRow,
        source: &str,
    ) -> Option<EventRecord> {
        let event_id = parse_id(sheet.value(row, EVENT_ID))?;
        let parent = sheet.value(row, PARENT_EVENT_ID);
        let parent_event_id = if parent.is_blank() {
            None
        } else {
            Some(parse_id(parent)?)
        };

        let mut record = EventRecord::new(event_id, parent_event_id).ok()?.with_source(source);
        for (index, column) in sheet.columns.iter().enumerate() {
            if column == EVENT_ID || column == PARENT_EVENT_ID {
                continue;
            }
            let cell = row.cell(index);
            if store.layout().is_native(column) {
                record.set_field(column.as_str(), cell.clone());
            } else if !cell.is_blank() {
                record.set_other(column.as_str(), &cell.as_text());
            }
        }
        for entry in &sheet.metadata {
            if !entry.value.is_blank() {
                record.metadata.insert(entry.key.clone(), entry.value.as_text());
            }
        }
        Some(record)
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}
