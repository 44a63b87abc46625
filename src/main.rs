//! samplecat CLI entry point
//!
//! Parses arguments, dispatches to the command implementations in `cli`,
//! prints errors to stderr and exits non-zero on failure.

use samplecat::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
