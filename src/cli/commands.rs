//! CLI command implementations
//!
//! Each command loads the config, sets the log level, opens what it needs and
//! prints its result. Only `check` and `insert` print text; the rest print
//! JSON.

use std::path::Path;

use serde_json::json;
use uuid::Uuid;

use crate::checker::SheetChecker;
use crate::hierarchy::{self, PropagationOptions, Propagator};
use crate::ingest::{collect_inputs, read_submission, ImportSummary, Importer};
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::schema::FieldRegistry;
use crate::storage::{log_path, EventStore, FileStore};
use crate::validator::{parse_number, CellValue};

use super::args::{Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{write_json, write_raw, write_report};

/// Parse arguments and run the chosen command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(&cli.config, cli.command)
}

pub fn run_command(config_path: &Path, cmd: Command) -> CliResult<()> {
    let config = load_config(config_path)?;
    match cmd {
        Command::Init => init(&config),
        Command::Check { file } => check(&config, &file),
        Command::Insert { path, update, force } => insert(&config, &path, update, force),
        Command::Propagate => propagate(&config),
        Command::Hanging => hanging(&config),
        Command::Lineage { event_id } => lineage(&config, &event_id),
        Command::Schema { fields } => schema(&config, &fields),
        Command::Replace { field, from, to } => replace(&config, &field, &from, &to),
        Command::Compact => compact(&config),
    }
}

fn load_config(path: &Path) -> CliResult<Config> {
    let config = Config::load(path)?;
    Logger::set_level(config.log_severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("data_dir", &config.data_dir), ("path", &path.display().to_string())],
    );
    Ok(config)
}

fn load_registry(config: &Config) -> CliResult<FieldRegistry> {
    let registry = config.registry()?;
    log_event_with_fields(
        Event::SchemaLoaded,
        &[
            ("fields", &registry.len().to_string()),
            ("source", config.schema_file.as_deref().unwrap_or("builtin")),
        ],
    );
    Ok(registry)
}

fn is_initialized(data_dir: &Path) -> bool {
    log_path(data_dir).exists()
}

fn open_store(config: &Config) -> CliResult<FileStore> {
    let data_dir = config.data_path();
    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }

    let store = FileStore::open(data_dir, config.store_layout()).map_err(|e| {
        if e.is_fatal() {
            log_event_with_fields(Event::StoreCorruption, &[("error", &e.to_string())]);
        }
        e
    })?;

    log_event_with_fields(
        Event::StoreOpened,
        &[
            ("events", &store.len().to_string()),
            ("frames", &store.frame_count().to_string()),
            ("path", &store.path().display().to_string()),
        ],
    );
    Ok(store)
}

/// Command-line values get the same numeric normalization as sheet cells
fn cell_from_arg(raw: &str) -> CellValue {
    match parse_number(raw) {
        Ok(number) => number.into_cell(),
        Err(_) => CellValue::text(raw),
    }
}

pub fn init(config: &Config) -> CliResult<()> {
    let data_dir = config.data_path();
    if is_initialized(data_dir) {
        return Err(CliError::already_initialized());
    }

    let store = FileStore::open(data_dir, config.store_layout())?;
    write_json(&json!({
        "initialized": true,
        "log": store.path().display().to_string(),
    }))
}

pub fn check(config: &Config, file: &Path) -> CliResult<()> {
    let registry = load_registry(config)?;
    let submission = read_submission(file, &config.sheet_layout())?;
    let report = SheetChecker::new(&registry).check(&submission)?;
    write_report(&report)?;

    if report.passed() {
        log_event_with_fields(Event::CheckPassed, &[("path", &file.display().to_string())]);
        Ok(())
    } else {
        log_event_with_fields(
            Event::CheckFailed,
            &[
                ("errors", &report.errors().len().to_string()),
                ("path", &file.display().to_string()),
            ],
        );
        Err(CliError::check_failed(1, 1))
    }
}

/// Checks and inserts every submission under `path`.
///
/// A failing submission is reported and skipped (or inserted with `force`);
/// an unreadable one is always skipped. The rest are still processed.
/// Exits non-zero if any was rejected.
pub fn insert(config: &Config, path: &Path, update: bool, force: bool) -> CliResult<()> {
    let registry = load_registry(config)?;
    let mut store = open_store(config)?;
    let checker = SheetChecker::new(&registry);
    let importer = Importer::new().with_update(update);
    let layout = config.sheet_layout();

    let files = collect_inputs(path)?;
    let mut total = ImportSummary::default();
    let mut rejected = 0;

    for file in &files {
        let submission = match read_submission(file, &layout) {
            Ok(submission) => submission,
            Err(e) => {
                rejected += 1;
                write_raw(&format!("{}: unreadable\n  {}", file.display(), e))?;
                log_event_with_fields(
                    Event::SubmissionSkipped,
                    &[("error", &e.to_string()), ("path", &file.display().to_string())],
                );
                continue;
            }
        };
        let report = checker.check(&submission)?;
        write_report(&report)?;

        if !report.passed() {
            log_event_with_fields(
                Event::CheckFailed,
                &[
                    ("errors", &report.errors().len().to_string()),
                    ("path", &file.display().to_string()),
                ],
            );
            if !force {
                rejected += 1;
                log_event_with_fields(Event::SubmissionSkipped, &[("path", &file.display().to_string())]);
                continue;
            }
        }

        let summary = importer.import(&mut store, &submission.prepare())?;
        total.absorb(&summary);
    }

    write_json(&json!({
        "files": files.len(),
        "rejected": rejected,
        "inserted": total.inserted,
        "updated": total.updated,
        "skipped_existing": total.skipped_existing,
        "skipped_invalid": total.skipped_invalid,
    }))?;

    if rejected > 0 {
        return Err(CliError::check_failed(rejected, files.len()));
    }
    Ok(())
}

pub fn propagate(config: &Config) -> CliResult<()> {
    let registry = load_registry(config)?;
    let mut store = open_store(config)?;
    let options = PropagationOptions {
        include_metadata: config.propagate_metadata,
    };
    let report = Propagator::with_options(&registry, options).run(&mut store)?;
    write_json(&report)
}

pub fn hanging(config: &Config) -> CliResult<()> {
    let store = open_store(config)?;
    let report = hierarchy::hanging_report(&store)?;
    write_json(&report)
}

pub fn lineage(config: &Config, event_id: &str) -> CliResult<()> {
    let id = Uuid::try_parse(event_id.trim())
        .map_err(|e| CliError::invalid_argument(format!("'{}' is not an event id: {}", event_id, e)))?;
    let store = open_store(config)?;
    let chain = hierarchy::lineage(&store, &id)?;
    write_json(&chain)
}

pub fn schema(config: &Config, fields: &[String]) -> CliResult<()> {
    let registry = load_registry(config)?;
    if fields.is_empty() {
        return write_raw(&registry.to_json()?);
    }
    let names: Vec<&str> = fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()).collect();
    let template = registry.template(&names)?;
    write_json(&template)
}

pub fn replace(config: &Config, field: &str, from: &str, to: &str) -> CliResult<()> {
    let registry = load_registry(config)?;
    registry.by_name(field)?;
    let mut store = open_store(config)?;
    let changed = hierarchy::replace_values(&mut store, field, &cell_from_arg(from), &cell_from_arg(to))?;
    write_json(&json!({ "field": field, "changed": changed }))
}

pub fn compact(config: &Config) -> CliResult<()> {
    let mut store = open_store(config)?;
    let before = store.frame_count();
    store.compact()?;
    log_event_with_fields(
        Event::StoreCompacted,
        &[
            ("frames_after", &store.frame_count().to_string()),
            ("frames_before", &before.to_string()),
        ],
    );
    write_json(&json!({
        "frames_before": before,
        "frames_after": store.frame_count(),
    }))
}
