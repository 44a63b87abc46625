//! Event records
//!
//! One record per sampling event. Native fields hold typed values for the
//! columns the store layout knows; everything else a submission carried is
//! kept verbatim in `other`. `metadata` is the dataset-level block shared by
//! all records of one submission.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validator::{CellValue, EMPTY_CELL};

use super::errors::{StorageError, StorageResult};

/// Stored sampling event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<Uuid>,
    /// Native attributes, keyed by field name
    #[serde(default)]
    pub fields: BTreeMap<String, CellValue>,
    /// Non-native columns, preserved as text
    #[serde(default)]
    pub other: BTreeMap<String, String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Newline separated change log
    #[serde(default)]
    pub history: String,
    /// File the record was inserted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl EventRecord {
    /// Create a record stamped with the current time.
    ///
    /// # Errors
    ///
    /// Rejects a record that names itself as parent.
    pub fn new(event_id: Uuid, parent_event_id: Option<Uuid>) -> StorageResult<Self> {
        if parent_event_id == Some(event_id) {
            return Err(StorageError::invalid_record(
                event_id,
                "eventID equals parentEventID",
            ));
        }
        let now = Utc::now();
        Ok(Self {
            event_id,
            parent_event_id,
            fields: BTreeMap::new(),
            other: BTreeMap::new(),
            metadata: BTreeMap::new(),
            created: now,
            modified: now,
            history: String::new(),
            source: None,
        })
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set_field(name, value.into());
        self
    }

    pub fn with_other(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.other.insert(key.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Native value, blank if unset
    pub fn field(&self, name: &str) -> &CellValue {
        self.fields.get(name).unwrap_or(&EMPTY_CELL)
    }

    /// Sets a native value; blank values remove the entry
    pub fn set_field(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        if value.is_blank() {
            self.fields.remove(&name);
        } else {
            self.fields.insert(name, value);
        }
    }

    /// Sets an `other` value; blank values remove the entry
    pub fn set_other(&mut self, key: impl Into<String>, value: &str) {
        let key = key.into();
        if value.trim().is_empty() {
            self.other.remove(&key);
        } else {
            self.other.insert(key, value.to_string());
        }
    }

    /// Appends a timestamped line to the change log
    pub fn append_history(&mut self, at: DateTime<Utc>, entry: impl AsRef<str>) {
        if !self.history.is_empty() {
            self.history.push('\n');
        }
        self.history.push_str(&at.format("%Y-%m-%d %H:%M:%SZ").to_string());
        self.history.push(' ');
        self.history.push_str(entry.as_ref());
    }

    /// Marks the record as changed now
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}
