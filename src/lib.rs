//! samplecat - field-sample metadata catalogue for marine expeditions
//!
//! Submitted spreadsheets are checked against a declarative field schema,
//! stored as a forest of sampling events, and inheritable attributes are
//! pushed from parent events down to every descendant.

pub mod checker;
pub mod cli;
pub mod hierarchy;
pub mod ingest;
pub mod observability;
pub mod schema;
pub mod storage;
pub mod validator;
