//! CLI module for samplecat
//!
//! Provides the command-line surface for:
//! - init: Create the event log
//! - check / insert: Validate and ingest submissions
//! - propagate / hanging / lineage / replace: Work on the stored hierarchy
//! - schema: Dump the field catalogue for the template generator
//! - compact: Drop superseded frames from the event log

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    check, compact, hanging, init, insert, lineage, propagate, replace, run, run_command, schema,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{render_report, write_json, write_report};
