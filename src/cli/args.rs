//! CLI argument definitions using clap
//!
//! Commands:
//! - samplecat init
//! - samplecat check <file>
//! - samplecat insert <file|dir> [--update] [--force]
//! - samplecat propagate
//! - samplecat hanging
//! - samplecat lineage <eventID>
//! - samplecat schema [--fields a,b]
//! - samplecat replace --field <name> --from <old> --to <new>
//! - samplecat compact

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// samplecat - field sample metadata checking and cataloguing
#[derive(Parser, Debug)]
#[command(name = "samplecat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./samplecat.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and an empty event log
    Init,

    /// Validate one submission and list every problem found
    Check {
        /// Submission file (.xlsx or .csv)
        file: PathBuf,
    },

    /// Check and insert a submission file or every submission in a directory
    Insert {
        /// Submission file or directory
        path: PathBuf,

        /// Replace events that are already stored
        #[arg(long)]
        update: bool,

        /// Insert submissions even when the check fails
        #[arg(long)]
        force: bool,
    },

    /// Push inheritable values from parents down to their children
    Propagate,

    /// List parent ids that match no stored event
    Hanging,

    /// Print an event and its stored ancestors
    Lineage {
        /// Event id
        event_id: String,
    },

    /// Print the field catalogue, or a template column list, as JSON
    Schema {
        /// Fields to include besides the required ones
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },

    /// Replace one exact value of a field across all events
    Replace {
        #[arg(long)]
        field: String,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Rewrite the event log keeping only the latest version of each event
    Compact,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_global() {
        let cli = Cli::try_parse_from(["samplecat", "check", "cruise.xlsx", "--config", "other.json"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("other.json"));
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn test_schema_fields_split_on_commas() {
        let cli = Cli::try_parse_from(["samplecat", "schema", "--fields", "gearType,bottleNumber"]).unwrap();
        match cli.command {
            Command::Schema { fields } => assert_eq!(fields, vec!["gearType", "bottleNumber"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_insert_flags() {
        let cli = Cli::try_parse_from(["samplecat", "insert", "incoming/", "--update"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./samplecat.json"));
        match cli.command {
            Command::Insert { update, force, .. } => assert!(update && !force),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
