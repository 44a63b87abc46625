//! Format dispatch

use std::fs;
use std::path::{Path, PathBuf};

use crate::checker::Submission;
use crate::observability::{log_event_with_fields, Event};

use super::delimited::read_csv;
use super::errors::{IngestError, IngestResult};
use super::workbook::{read_workbook, SheetLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionFormat {
    Xlsx,
    Csv,
}

impl SubmissionFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        // Office lock files and CSV metadata sidecars are not submissions
        if name.starts_with("~$") || name.ends_with(".metadata.csv") {
            return None;
        }
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "xlsx" => Some(SubmissionFormat::Xlsx),
            "csv" => Some(SubmissionFormat::Csv),
            _ => None,
        }
    }
}

pub fn read_submission(path: &Path, layout: &SheetLayout) -> IngestResult<Submission> {
    let submission = match SubmissionFormat::from_path(path) {
        Some(SubmissionFormat::Xlsx) => read_workbook(path, layout)?,
        Some(SubmissionFormat::Csv) => read_csv(path)?,
        None => {
            return Err(IngestError::UnsupportedFormat {
                path: path.display().to_string(),
            })
        }
    };
    log_event_with_fields(
        Event::SubmissionRead,
        &[
            ("metadata", &submission.metadata.len().to_string()),
            ("path", &path.display().to_string()),
            ("rows", &submission.rows.len().to_string()),
        ],
    );
    Ok(submission)
}

/// The submission files under `path`, sorted by name. A single file is
/// returned as is.
pub fn collect_inputs(path: &Path) -> IngestResult<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let io_error = |source| IngestError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(io_error)? {
        let file = entry.map_err(io_error)?.path();
        if file.is_file() && SubmissionFormat::from_path(&file).is_some() {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}
