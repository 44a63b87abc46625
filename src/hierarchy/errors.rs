//! Hierarchy error types
//!
//! Error codes:
//! - SAMPLECAT_HIERARCHY_CYCLE (FATAL)
//! - SAMPLECAT_HIERARCHY_UNKNOWN_EVENT (ERROR)
//! - SAMPLECAT_HIERARCHY_STORAGE (inherits the storage error's severity)

use std::fmt;

use uuid::Uuid;

use crate::storage::{StorageError, StorageErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyErrorCode {
    /// The parent relation is not a forest
    Cycle,
    /// The event is not in the snapshot
    UnknownEvent,
    /// The store failed underneath
    Storage,
}

impl HierarchyErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            HierarchyErrorCode::Cycle => "SAMPLECAT_HIERARCHY_CYCLE",
            HierarchyErrorCode::UnknownEvent => "SAMPLECAT_HIERARCHY_UNKNOWN_EVENT",
            HierarchyErrorCode::Storage => "SAMPLECAT_HIERARCHY_STORAGE",
        }
    }
}

/// Hierarchy error type with full context
#[derive(Debug)]
pub struct HierarchyError {
    code: HierarchyErrorCode,
    message: String,
    details: Option<String>,
    source: Option<StorageError>,
}

impl HierarchyError {
    /// Parent links form a loop through `path`
    pub fn cycle(path: &[Uuid]) -> Self {
        let ids: Vec<String> = path.iter().map(Uuid::to_string).collect();
        Self {
            code: HierarchyErrorCode::Cycle,
            message: format!("Parent links form a cycle of {} events", path.len()),
            details: Some(format!("cycle: {}", ids.join(" -> "))),
            source: None,
        }
    }

    pub fn unknown_event(event_id: &Uuid) -> Self {
        Self {
            code: HierarchyErrorCode::UnknownEvent,
            message: format!("No event with id {}", event_id),
            details: None,
            source: None,
        }
    }

    pub fn code(&self) -> HierarchyErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        match (self.code, &self.source) {
            (HierarchyErrorCode::Cycle, _) => Severity::Fatal,
            (_, Some(source)) if source.is_fatal() => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for HierarchyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<StorageError> for HierarchyError {
    fn from(err: StorageError) -> Self {
        let code = match err.code() {
            StorageErrorCode::UnknownEvent => HierarchyErrorCode::UnknownEvent,
            _ => HierarchyErrorCode::Storage,
        };
        Self {
            code,
            message: err.to_string(),
            details: None,
            source: Some(err),
        }
    }
}

pub type HierarchyResult<T> = Result<T, HierarchyError>;
