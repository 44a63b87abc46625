//! Field Schema Registry
//!
//! Declarative definition of every recognised field: name, display name,
//! validation rule, presentation hints and inheritance flags.
//!
//! # Design Principles
//!
//! - Closed rule vocabulary, dispatched by `match`
//! - Validated once at load time, immutable afterwards
//! - Passed explicitly, never process-global

mod bounds;
mod catalogue;
mod errors;
mod registry;
mod types;

pub use bounds::{day_fraction_to_time, parse_clock, DateBound, TimeBound};
pub use catalogue::{
    builtin_fields, CRUISE_NUMBER, EVENT_ID, GEAR_TYPE, PARENT_EVENT_ID, SAMPLE_LOCATION,
    SAMPLE_TYPE, STATION_NAME,
};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use registry::FieldRegistry;
pub use types::{is_identifier_name, CompareOp, FieldSpec, ValidationRule};
