//! Delimited (CSV) submissions
//!
//! Row 1 holds the field names and data starts on row 2. The metadata block,
//! if any, sits next to the data file as `<stem>.metadata.csv`: one
//! `key,value` pair per line, no header.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};

use crate::checker::{MetadataEntry, Submission};
use crate::validator::CellValue;

use super::errors::{IngestError, IngestResult};

/// Path of the metadata sidecar for a CSV data file
pub fn metadata_sidecar(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    path.with_file_name(format!("{}.metadata.csv", stem))
}

fn rows(path: &Path) -> IngestResult<Vec<StringRecord>> {
    let display = path.display().to_string();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: display.clone(),
            source,
        })?;

    reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| IngestError::Csv { path: display, source })
}

pub fn read_csv(path: &Path) -> IngestResult<Submission> {
    let mut records = rows(path)?.into_iter();
    let header: Vec<String> = records
        .next()
        .ok_or_else(|| IngestError::MissingHeader {
            path: path.display().to_string(),
            row: 1,
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let body: Vec<Vec<CellValue>> = records
        .map(|record| record.iter().map(CellValue::text).collect())
        .collect();

    let sidecar = metadata_sidecar(path);
    let metadata = if sidecar.is_file() {
        read_metadata(&sidecar)?
    } else {
        Vec::new()
    };

    Ok(Submission::new(header, body)
        .with_metadata(metadata)
        .with_source(path.display().to_string()))
}

fn read_metadata(path: &Path) -> IngestResult<Vec<MetadataEntry>> {
    Ok(rows(path)?
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let key = record.get(0)?.trim();
            if key.is_empty() {
                return None;
            }
            Some(MetadataEntry {
                key: key.to_string(),
                value: CellValue::text(record.get(1).unwrap_or_default()),
                row: index + 1,
            })
        })
        .collect())
}
