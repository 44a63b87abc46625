//! Lifecycle events
//!
//! Every log line carries one of these as its `event`.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Startup
    ConfigLoaded,
    SchemaLoaded,
    StoreOpened,
    StoreCompacted,
    /// Event log failed checksum or framing (FATAL)
    StoreCorruption,

    // Submissions
    SubmissionRead,
    /// Metadata sheet absent from a workbook
    MetadataMissing,
    CheckPassed,
    CheckFailed,
    /// Submission rejected and skipped by the insert path
    SubmissionSkipped,

    // Insert path
    RecordInserted,
    RecordUpdated,
    /// Existing eventID and update mode off
    RecordExists,
    /// Row without a usable eventID
    RowSkipped,
    InsertComplete,

    // Propagation
    PropagationStart,
    PropagationComplete,
    /// Parent links loop (FATAL)
    PropagationCycle,

    // Repair
    DanglingScan,
    ValuesReplaced,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreCompacted => "STORE_COMPACTED",
            Event::StoreCorruption => "STORE_CORRUPTION",

            Event::SubmissionRead => "SUBMISSION_READ",
            Event::MetadataMissing => "METADATA_SHEET_MISSING",
            Event::CheckPassed => "CHECK_PASSED",
            Event::CheckFailed => "CHECK_FAILED",
            Event::SubmissionSkipped => "SUBMISSION_SKIPPED",

            Event::RecordInserted => "RECORD_INSERTED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordExists => "RECORD_EXISTS",
            Event::RowSkipped => "ROW_SKIPPED",
            Event::InsertComplete => "INSERT_COMPLETE",

            Event::PropagationStart => "PROPAGATION_BEGIN",
            Event::PropagationComplete => "PROPAGATION_COMPLETE",
            Event::PropagationCycle => "PROPAGATION_CYCLE",

            Event::DanglingScan => "DANGLING_SCAN_COMPLETE",
            Event::ValuesReplaced => "VALUES_REPLACED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::StoreCorruption | Event::PropagationCycle => Severity::Fatal,
            Event::CheckFailed | Event::SubmissionSkipped | Event::MetadataMissing | Event::RowSkipped => {
                Severity::Warn
            }
            Event::RecordInserted | Event::RecordUpdated | Event::RecordExists => Severity::Trace,
            _ => Severity::Info,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
