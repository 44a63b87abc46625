//! Sheet Checker
//!
//! Validates a whole submission and returns a complete report instead of
//! failing on the first problem. The verdict is binary (`good`/`not good`)
//! and always comes with the full error list.

mod ranges;
mod report;
mod sheet;
mod submission;

pub use ranges::compact_rows;
pub use report::{CheckReport, Finding, FindingKind};
pub use sheet::{SheetChecker, GEAR_EXEMPT_FIELDS};
pub use submission::{MetadataEntry, PreparedRow, PreparedSheet, Submission};
