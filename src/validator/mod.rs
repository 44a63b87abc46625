//! Validator/Evaluator
//!
//! Turns a field's `ValidationRule` into a predicate over cell values.
//! Blank cells pass every rule; whether a value is required is the sheet
//! checker's concern, so "missing" and "malformed" stay distinct.

mod errors;
mod evaluator;
mod numeric;
mod value;

pub use errors::{ValidatorError, ValidatorResult};
pub use evaluator::{is_canonical_uuid, today, CompiledSchema, Evaluator};
pub use numeric::{normalize_number, parse_number, Number};
pub use value::{serial_to_date, CellValue, EMPTY_CELL};
