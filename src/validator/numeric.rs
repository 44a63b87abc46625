//! Numeric normalization
//!
//! Spreadsheet numbers arrive as numbers, or as text with decimal commas and
//! a stray leading apostrophe (the "store as text" marker). Text is cleaned,
//! then parsed as an integer, falling back to a float.

use super::errors::{ValidatorError, ValidatorResult};
use super::value::CellValue;

/// A coerced numeric value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    /// Whether the value has no fractional part
    pub fn is_integral(&self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(f) => f.fract() == 0.0,
        }
    }

    pub fn into_cell(self) -> CellValue {
        match self {
            Number::Int(i) => CellValue::Int(i),
            Number::Float(f) => CellValue::Float(f),
        }
    }
}

/// Coerce a cell to a number
pub fn normalize_number(value: &CellValue) -> ValidatorResult<Number> {
    match value {
        CellValue::Int(i) => Ok(Number::Int(*i)),
        CellValue::Float(f) if f.is_finite() => Ok(Number::Float(*f)),
        CellValue::Float(f) => Err(ValidatorError::NonFinite(f.to_string())),
        CellValue::Bool(b) => Err(ValidatorError::NotNumeric(b.to_string())),
        CellValue::Text(raw) => parse_number(raw),
        other => Err(ValidatorError::NotNumeric(other.as_text())),
    }
}

/// Parse numeric text after cleaning spreadsheet artifacts
pub fn parse_number(raw: &str) -> ValidatorResult<Number> {
    let cleaned = raw.trim().trim_start_matches('\'').trim().replace(',', ".");
    if cleaned.is_empty() {
        return Err(ValidatorError::NotNumeric(raw.to_string()));
    }
    if let Ok(i) = cleaned.parse::<i64>() {
        return Ok(Number::Int(i));
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Number::Float(f)),
        Ok(_) => Err(ValidatorError::NonFinite(raw.to_string())),
        Err(_) => Err(ValidatorError::NotNumeric(raw.to_string())),
    }
}
