//! Range bounds for date and time rules
//!
//! Date bounds are either literal calendar dates or a formula relative to the
//! day the check runs (`=TODAY()`, `=TODAY()+N`, `=TODAY()-N`). Time bounds are
//! either a clock time or a fraction of a 24h day, the form spreadsheet
//! validation cells use (`0.9999999` is one tick before midnight).

use std::fmt;
use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

fn today_formula() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^=?\s*today\s*(?:\(\s*\))?\s*(?:([+-])\s*(\d+))?$")
            .unwrap_or_else(|e| panic!("today formula pattern: {}", e))
    })
}

/// Lower or upper bound of a date rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DateBound {
    /// Literal calendar date
    Fixed(NaiveDate),
    /// Today's date shifted by a number of days
    Today {
        /// Days added to the evaluation date (negative for the past)
        offset_days: i64,
    },
}

impl DateBound {
    /// Parse a literal `YYYY-MM-DD` date or a `=TODAY()` formula
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if let Some(caps) = today_formula().captures(raw) {
            let offset_days = match (caps.get(1), caps.get(2)) {
                (Some(sign), Some(n)) => {
                    let n: i64 = n
                        .as_str()
                        .parse()
                        .map_err(|_| format!("day offset out of range in '{}'", raw))?;
                    let n = if sign.as_str() == "-" { -n } else { n };
                    if Duration::try_days(n).is_none() {
                        return Err(format!("day offset out of range in '{}'", raw));
                    }
                    n
                }
                _ => 0,
            };
            return Ok(DateBound::Today { offset_days });
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(DateBound::Fixed)
            .map_err(|_| format!("'{}' is neither a YYYY-MM-DD date nor a =TODAY() formula", raw))
    }

    /// Resolve the bound against the evaluation date
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            DateBound::Fixed(date) => *date,
            DateBound::Today { offset_days } => Duration::try_days(*offset_days)
                .and_then(|offset| today.checked_add_signed(offset))
                .unwrap_or(if *offset_days < 0 {
                    NaiveDate::MIN
                } else {
                    NaiveDate::MAX
                }),
        }
    }

    /// Whether the bound moves with the evaluation date
    pub fn is_relative(&self) -> bool {
        matches!(self, DateBound::Today { .. })
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateBound::Fixed(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DateBound::Today { offset_days: 0 } => write!(f, "=TODAY()"),
            DateBound::Today { offset_days } if *offset_days > 0 => {
                write!(f, "=TODAY()+{}", offset_days)
            }
            DateBound::Today { offset_days } => write!(f, "=TODAY()-{}", offset_days.unsigned_abs()),
        }
    }
}

impl TryFrom<String> for DateBound {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DateBound::parse(&value)
    }
}

impl From<DateBound> for String {
    fn from(bound: DateBound) -> Self {
        bound.to_string()
    }
}

/// Lower or upper bound of a time-of-day rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeBound", into = "RawTimeBound")]
pub enum TimeBound {
    /// Fraction of a 24h day in `[0, 1)`
    DayFraction(f64),
    /// Literal clock time
    Clock(NaiveTime),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawTimeBound {
    Fraction(f64),
    Text(String),
}

impl TimeBound {
    /// Normalize to a comparable time of day
    pub fn to_time(&self) -> NaiveTime {
        match self {
            TimeBound::DayFraction(fraction) => day_fraction_to_time(*fraction),
            TimeBound::Clock(time) => *time,
        }
    }

    /// Structural check used when a schema is loaded
    pub fn check(&self) -> Result<(), String> {
        match self {
            TimeBound::DayFraction(fraction) if !fraction.is_finite() => {
                Err("time bound must be a finite day fraction".to_string())
            }
            TimeBound::DayFraction(fraction) if *fraction < 0.0 || *fraction >= 1.0 => Err(format!(
                "day fraction {} is outside [0, 1)",
                fraction
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for TimeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_time().format("%H:%M:%S"))
    }
}

impl TryFrom<RawTimeBound> for TimeBound {
    type Error = String;

    fn try_from(raw: RawTimeBound) -> Result<Self, Self::Error> {
        match raw {
            RawTimeBound::Fraction(f) => Ok(TimeBound::DayFraction(f)),
            RawTimeBound::Text(text) => parse_clock(&text)
                .map(TimeBound::Clock)
                .ok_or_else(|| format!("'{}' is not a HH:MM[:SS] time", text)),
        }
    }
}

impl From<TimeBound> for RawTimeBound {
    fn from(bound: TimeBound) -> Self {
        match bound {
            TimeBound::DayFraction(f) => RawTimeBound::Fraction(f),
            TimeBound::Clock(t) => RawTimeBound::Text(t.format("%H:%M:%S").to_string()),
        }
    }
}

/// Convert the fractional part of a day to a time of day, saturating at 23:59:59
pub fn day_fraction_to_time(fraction: f64) -> NaiveTime {
    let fraction = if fraction.is_finite() {
        fraction.rem_euclid(1.0)
    } else {
        0.0
    };
    let seconds = ((fraction * SECONDS_PER_DAY).round() as u32).min(86_399);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse `HH:MM:SS` or `HH:MM`
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}
