//! Validator errors
//!
//! A value that fails its rule is not an error, it is a `false` verdict.
//! These errors cover coercion failures (reported, then turned into verdicts)
//! and misconfigured rules.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidatorError {
    #[error("'{0}' is not a number")]
    NotNumeric(String),

    #[error("non-finite number '{0}'")]
    NonFinite(String),

    #[error("field '{field}' has an unusable rule: {reason}")]
    InvalidRule { field: String, reason: String },
}

pub type ValidatorResult<T> = Result<T, ValidatorError>;
