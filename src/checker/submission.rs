//! Submissions and pre-processing
//!
//! A submission is a data table (header row of field names plus body rows)
//! and a metadata block of key/value pairs. Before checking, helper columns
//! without a header are dropped, fully blank rows are removed (row numbers of
//! the remaining rows are kept), identifier cells get transcription fixes and
//! other text cells are numerically normalized where possible.

use serde::{Deserialize, Serialize};

use crate::schema::is_identifier_name;
use crate::validator::{parse_number, CellValue, EMPTY_CELL};

/// One key/value pair from the metadata block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: CellValue,
    /// Spreadsheet row the pair was read from
    pub row: usize,
}

/// Raw two-part document as produced by a reader
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub metadata: Vec<MetadataEntry>,
    /// Spreadsheet row number of `rows[0]`
    pub first_data_row: usize,
    /// File the submission was read from
    pub source: Option<String>,
}

impl Submission {
    /// Submission whose first body row is spreadsheet row 2 (CSV layout)
    pub fn new(header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            header,
            rows,
            metadata: Vec::new(),
            first_data_row: 2,
            source: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Vec<MetadataEntry>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_first_data_row(mut self, row: usize) -> Self {
        self.first_data_row = row;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Apply pre-processing and produce the checkable sheet
    pub fn prepare(&self) -> PreparedSheet {
        let kept: Vec<(usize, String)> = self
            .header
            .iter()
            .enumerate()
            .map(|(i, h)| (i, h.trim().to_string()))
            .filter(|(_, h)| !h.is_empty())
            .collect();

        let identifier: Vec<bool> = kept.iter().map(|(_, h)| is_identifier_name(h)).collect();

        let mut rows = Vec::with_capacity(self.rows.len());
        for (index, raw) in self.rows.iter().enumerate() {
            let cells: Vec<CellValue> = kept
                .iter()
                .zip(&identifier)
                .map(|((col, _), is_id)| {
                    let cell = raw.get(*col).unwrap_or(&EMPTY_CELL);
                    normalize_cell(cell, *is_id)
                })
                .collect();

            if cells.iter().all(CellValue::is_blank) {
                continue;
            }

            rows.push(PreparedRow {
                number: index + self.first_data_row,
                cells,
            });
        }

        PreparedSheet {
            columns: kept.into_iter().map(|(_, h)| h).collect(),
            rows,
            metadata: self.metadata.clone(),
            source: self.source.clone(),
        }
    }
}

fn normalize_cell(cell: &CellValue, identifier: bool) -> CellValue {
    match cell {
        CellValue::Text(text) if identifier => {
            CellValue::Text(text.trim().replace(['+', '/'], "-"))
        }
        CellValue::Text(text) if !cell.is_blank() => match parse_number(text) {
            Ok(number) => number.into_cell(),
            Err(_) => cell.clone(),
        },
        CellValue::Text(_) => CellValue::Empty,
        other => other.clone(),
    }
}

/// Body row after pre-processing
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    /// Spreadsheet row number
    pub number: usize,
    /// One cell per kept column
    pub cells: Vec<CellValue>,
}

impl PreparedRow {
    pub fn cell(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }
}

/// Submission after pre-processing
#[derive(Debug, Clone)]
pub struct PreparedSheet {
    pub columns: Vec<String>,
    pub rows: Vec<PreparedRow>,
    pub metadata: Vec<MetadataEntry>,
    pub source: Option<String>,
}

impl PreparedSheet {
    /// Index of the first column with this header
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Cell of a named column, blank if the column is absent
    pub fn value<'s>(&'s self, row: &'s PreparedRow, name: &str) -> &'s CellValue {
        match self.column(name) {
            Some(i) => row.cell(i),
            None => &EMPTY_CELL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_headerless_columns_dropped() {
        let submission = Submission::new(
            vec!["eventID".into(), "".into(), " stationName ".into()],
            vec![vec![text("a"), text("helper"), text("P1")]],
        );
        let sheet = submission.prepare();
        assert_eq!(sheet.columns, vec!["eventID", "stationName"]);
        assert_eq!(sheet.rows[0].cells, vec![text("a"), text("P1")]);
    }

    #[test]
    fn test_identifier_transcription_fixes() {
        let submission = Submission::new(
            vec!["eventID".into(), "parentEventID".into()],
            vec![vec![text("1111+111/"), text(" 22/22 ")]],
        );
        let sheet = submission.prepare();
        assert_eq!(sheet.rows[0].cells, vec![text("1111-111-"), text("22-22")]);
    }

    #[test]
    fn test_numeric_normalization_is_opportunistic() {
        let submission = Submission::new(
            vec!["decimalLatitude".into(), "stationName".into(), "bottleNumber".into()],
            vec![vec![text("78,1500"), text("P4"), text("'5")]],
        );
        let sheet = submission.prepare();
        assert_eq!(
            sheet.rows[0].cells,
            vec![CellValue::Float(78.15), text("P4"), CellValue::Int(5)]
        );
    }

    #[test]
    fn test_blank_rows_dropped_numbering_kept() {
        let submission = Submission::new(
            vec!["eventID".into()],
            vec![vec![text("a")], vec![text("  ")], vec![], vec![text("b")]],
        )
        .with_first_data_row(4);
        let sheet = submission.prepare();
        let numbers: Vec<usize> = sheet.rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![4, 7]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let submission = Submission::new(
            vec!["eventID".into(), "stationName".into()],
            vec![vec![text("a")]],
        );
        let sheet = submission.prepare();
        let row = &sheet.rows[0];
        assert!(sheet.value(row, "stationName").is_blank());
        assert!(sheet.value(row, "nope").is_blank());
    }
}
