//! Spreadsheet cell values
//!
//! Cells are weakly typed: the same column may hold text in one row and a
//! number in the next. `CellValue` keeps what the reader produced and offers
//! the conversions the rules need.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::schema::{day_fraction_to_time, parse_clock};

/// Value of one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

/// Shared blank cell for lookups that find nothing
pub static EMPTY_CELL: CellValue = CellValue::Empty;

fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Convert a spreadsheet serial day number to a date, ignoring the time part.
///
/// Serials past the calendar range are `None`.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial > i64::MAX as f64 {
        return None;
    }
    let days = Duration::try_days(serial.floor() as i64)?;
    serial_epoch().checked_add_signed(days)
}

impl CellValue {
    /// Builds a text cell, mapping blank strings to `Empty`
    pub fn text(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw)
        }
    }

    /// Empty, whitespace-only text, `nan` text, or a NaN float
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
            }
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// String form used for list membership, lengths and storage
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Time(t) => t.format("%H:%M:%S").to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Calendar date, accepting ISO text and spreadsheet serials
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Int(i) => serial_to_date(*i as f64),
            CellValue::Float(f) => serial_to_date(*f),
            CellValue::Text(s) => {
                let s = s.trim();
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .or_else(|| {
                        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
                            .ok()
                            .map(|dt| dt.date())
                    })
            }
            _ => None,
        }
    }

    /// Time of day, accepting clock text and day fractions
    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            CellValue::Time(t) => Some(*t),
            CellValue::DateTime(dt) => Some(dt.time()),
            CellValue::Float(f) if f.is_finite() && *f >= 0.0 => Some(day_fraction_to_time(*f)),
            CellValue::Int(i) if *i >= 0 => Some(day_fraction_to_time(*i as f64)),
            CellValue::Text(s) => parse_clock(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(raw: &str) -> Self {
        CellValue::text(raw)
    }
}

impl From<String> for CellValue {
    fn from(raw: String) -> Self {
        CellValue::text(raw)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(v: NaiveDate) -> Self {
        CellValue::Date(v)
    }
}

impl From<NaiveTime> for CellValue {
    fn from(v: NaiveTime) -> Self {
        CellValue::Time(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_forms() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::Text("   ".into()).is_blank());
        assert!(CellValue::Text("NaN".into()).is_blank());
        assert!(CellValue::Float(f64::NAN).is_blank());
        assert!(!CellValue::Int(0).is_blank());
        assert!(!CellValue::Text("0".into()).is_blank());
    }

    #[test]
    fn test_text_constructor_maps_blank_to_empty() {
        assert_eq!(CellValue::text("  "), CellValue::Empty);
        assert_eq!(CellValue::text("x"), CellValue::Text("x".into()));
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(CellValue::Int(2018616).as_text(), "2018616");
        assert_eq!(CellValue::Float(78.15).as_text(), "78.15");
        assert_eq!(CellValue::Float(5.0).as_text(), "5");
        let date = NaiveDate::from_ymd_opt(2018, 7, 1).unwrap();
        assert_eq!(CellValue::Date(date).as_text(), "2018-07-01");
    }

    #[test]
    fn test_serial_dates() {
        // 43282 is 2018-07-01 in the 1900 date system
        let expected = NaiveDate::from_ymd_opt(2018, 7, 1).unwrap();
        assert_eq!(CellValue::Int(43282).as_date(), Some(expected));
        assert_eq!(CellValue::Float(43282.75).as_date(), Some(expected));
        assert_eq!(CellValue::Text("2018-07-01".into()).as_date(), Some(expected));
        assert_eq!(CellValue::Text("July".into()).as_date(), None);
    }

    #[test]
    fn test_time_forms() {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert_eq!(CellValue::Float(0.5).as_time(), Some(noon));
        assert_eq!(CellValue::Text("12:00".into()).as_time(), Some(noon));
        assert_eq!(CellValue::Text("noon".into()).as_time(), None);
    }

    #[test]
    fn test_serials_past_calendar_range() {
        assert_eq!(serial_to_date(999_999_999_999.0), None);
        assert_eq!(serial_to_date(1e300), None);
        assert_eq!(serial_to_date(-1.0), None);
        assert_eq!(CellValue::Int(i64::MAX).as_date(), None);
        assert_eq!(CellValue::Int(999_999_999_999).as_date(), None);
    }

    #[test]
    fn test_whole_day_counts_are_midnight() {
        // Integers follow the same day-fraction reading as floats
        assert_eq!(CellValue::Int(0).as_time(), Some(NaiveTime::MIN));
        assert_eq!(CellValue::Int(1).as_time(), CellValue::Float(1.0).as_time());
        assert_eq!(CellValue::Int(i64::MAX).as_time(), Some(NaiveTime::MIN));
        assert_eq!(CellValue::Int(-1).as_time(), None);
        assert_eq!(CellValue::Float(-1.0).as_time(), None);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&CellValue::Int(3)).unwrap();
        assert_eq!(json, r#"{"type":"int","value":3}"#);
        let back: CellValue = serde_json::from_str(r#"{"type":"empty"}"#).unwrap();
        assert_eq!(back, CellValue::Empty);
    }
}
