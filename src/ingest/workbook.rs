//! XLSX submissions
//!
//! Templates carry the data on one sheet, with the field names on a fixed
//! header row, and the metadata block on another. Metadata rows are
//! `display name | field name | value`; a plain two-column `key | value`
//! sheet is read too.

use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::checker::{MetadataEntry, Submission};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::day_fraction_to_time;
use crate::validator::{serial_to_date, CellValue, EMPTY_CELL};

use super::errors::{IngestError, IngestResult};

/// Where a workbook keeps its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub data_sheet: String,
    pub metadata_sheet: String,
    /// 1-based row holding the field names
    pub header_row: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            data_sheet: "Data".to_string(),
            metadata_sheet: "Metadata".to_string(),
            header_row: 3,
        }
    }
}

fn convert_serial(serial: f64) -> CellValue {
    if !serial.is_finite() {
        return CellValue::Empty;
    }
    if serial < 1.0 {
        return CellValue::Time(day_fraction_to_time(serial));
    }
    let Some(date) = serial_to_date(serial) else {
        return CellValue::Float(serial);
    };
    let fraction = serial - serial.floor();
    if fraction == 0.0 {
        CellValue::Date(date)
    } else {
        CellValue::DateTime(date.and_time(day_fraction_to_time(fraction)))
    }
}

fn convert_iso(raw: &str) -> CellValue {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return CellValue::Date(date);
    }
    if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M:%S") {
        return CellValue::Time(time);
    }
    CellValue::text(raw)
}

fn convert(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => convert_serial(dt.as_f64()),
        Data::DateTimeIso(s) => convert_iso(s),
        Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(e) => CellValue::text(e.to_string()),
    }
}

/// Dense grid indexed by absolute 0-based row and column
fn grid(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    let mut out: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col_offset as usize];
        cells.extend(row.iter().map(convert));
        out.push(cells);
    }
    out
}

fn metadata_entries(rows: &[Vec<CellValue>]) -> Vec<MetadataEntry> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let cell = |i: usize| row.get(i).unwrap_or(&EMPTY_CELL);
            let (key, value) = if row.len() >= 3 && !cell(1).is_blank() {
                (cell(1), cell(2))
            } else {
                (cell(0), cell(1))
            };
            if key.is_blank() {
                return None;
            }
            Some(MetadataEntry {
                key: key.as_text().trim().to_string(),
                value: value.clone(),
                row: index + 1,
            })
        })
        .collect()
}

pub fn read_workbook(path: &Path, layout: &SheetLayout) -> IngestResult<Submission> {
    let display = path.display().to_string();
    let xlsx_error = |source: calamine::XlsxError| IngestError::Xlsx {
        path: path.display().to_string(),
        source,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(xlsx_error)?;
    let sheets = workbook.sheet_names();

    if !sheets.iter().any(|s| s == &layout.data_sheet) {
        return Err(IngestError::MissingSheet {
            path: display,
            sheet: layout.data_sheet.clone(),
        });
    }
    let data = grid(&workbook.worksheet_range(&layout.data_sheet).map_err(xlsx_error)?);

    let header_index = layout.header_row.saturating_sub(1);
    let header: Vec<String> = data
        .get(header_index)
        .ok_or_else(|| IngestError::MissingHeader {
            path: display.clone(),
            row: layout.header_row,
        })?
        .iter()
        .map(|cell| if cell.is_blank() { String::new() } else { cell.as_text() })
        .collect();
    let body = data[header_index + 1..].to_vec();

    let metadata = if sheets.iter().any(|s| s == &layout.metadata_sheet) {
        metadata_entries(&grid(
            &workbook.worksheet_range(&layout.metadata_sheet).map_err(xlsx_error)?,
        ))
    } else {
        log_event_with_fields(
            Event::MetadataMissing,
            &[("path", &display), ("sheet", &layout.metadata_sheet)],
        );
        Vec::new()
    };

    Ok(Submission::new(header, body)
        .with_metadata(metadata)
        .with_first_data_row(header_index + 2)
        .with_source(display))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serials_become_dates_and_times() {
        assert_eq!(convert_serial(0.5), CellValue::Time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
        assert_eq!(convert_serial(44927.0), CellValue::Date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()));
        assert_eq!(
            convert_serial(44927.25),
            CellValue::DateTime(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(6, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_out_of_range_serial_stays_a_number() {
        assert_eq!(convert_serial(999_999_999_999.0), CellValue::Float(999_999_999_999.0));
        assert_eq!(convert_serial(1e300), CellValue::Float(1e300));
        assert_eq!(convert_serial(f64::INFINITY), CellValue::Empty);
    }

    #[test]
    fn test_iso_strings() {
        assert_eq!(convert_iso("2023-01-01"), CellValue::Date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()));
        assert_eq!(convert_iso("later"), CellValue::from("later"));
    }

    #[test]
    fn test_metadata_three_column_layout() {
        let rows = vec![
            vec![CellValue::from("Title"), CellValue::from("title"), CellValue::from("Nansen Legacy")],
            vec![CellValue::from("Abstract"), CellValue::from("abstract"), CellValue::Empty],
            vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
        ];
        let entries = metadata_entries(&rows);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "title");
        assert_eq!(entries[0].value, CellValue::from("Nansen Legacy"));
        assert_eq!(entries[1].row, 2);
        assert!(entries[1].value.is_blank());
    }

    #[test]
    fn test_metadata_two_column_layout() {
        let rows = vec![vec![CellValue::from("title"), CellValue::from("Cruise")]];
        let entries = metadata_entries(&rows);
        assert_eq!(entries[0].key, "title");
        assert_eq!(entries[0].value, CellValue::from("Cruise"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = read_workbook(Path::new("/nonexistent/file.xlsx"), &SheetLayout::default()).unwrap_err();
        assert!(matches!(err, IngestError::Xlsx { .. }));
    }
}
