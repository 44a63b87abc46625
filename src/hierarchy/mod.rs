//! Event hierarchy
//!
//! Events form a forest through `parentEventId`. This module snapshots that
//! relation into an arena, pushes inheritable values down it and reports
//! links that point nowhere.

mod errors;
mod propagate;
mod repair;
mod tree;

pub use errors::{HierarchyError, HierarchyErrorCode, HierarchyResult, Severity};
pub use propagate::{PropagationOptions, PropagationReport, Propagator};
pub use repair::{ancestors, hanging_report, lineage, replace_values};
pub use tree::EventTree;
