//! CLI-specific error types
//!
//! Every CLI error ends the process with exit code 1.

use std::fmt;
use std::io;

use crate::hierarchy::HierarchyError;
use crate::ingest::IngestError;
use crate::schema::SchemaError;
use crate::storage::StorageError;
use crate::validator::ValidatorError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Already initialized
    AlreadyInitialized,
    /// Not initialized
    NotInitialized,
    /// Bad command argument
    InvalidArgument,
    /// Field catalogue could not be loaded
    SchemaError,
    /// Event store failure
    StorageError,
    /// Propagation or hierarchy query failure
    HierarchyError,
    /// Submission could not be read
    IngestError,
    /// Submission did not pass the check
    CheckFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SAMPLECAT_CLI_CONFIG_ERROR",
            Self::IoError => "SAMPLECAT_CLI_IO_ERROR",
            Self::AlreadyInitialized => "SAMPLECAT_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "SAMPLECAT_CLI_NOT_INITIALIZED",
            Self::InvalidArgument => "SAMPLECAT_CLI_INVALID_ARGUMENT",
            Self::SchemaError => "SAMPLECAT_CLI_SCHEMA_ERROR",
            Self::StorageError => "SAMPLECAT_CLI_STORAGE_ERROR",
            Self::HierarchyError => "SAMPLECAT_CLI_HIERARCHY_ERROR",
            Self::IngestError => "SAMPLECAT_CLI_INGEST_ERROR",
            Self::CheckFailed => "SAMPLECAT_CLI_CHECK_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'samplecat init' first.",
        )
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// `rejected` of `total` submissions did not pass
    pub fn check_failed(rejected: usize, total: usize) -> Self {
        Self::new(
            CliErrorCode::CheckFailed,
            format!("{} of {} submission(s) did not pass the check", rejected, total),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::new(CliErrorCode::StorageError, e.to_string())
    }
}

impl From<HierarchyError> for CliError {
    fn from(e: HierarchyError) -> Self {
        Self::new(CliErrorCode::HierarchyError, e.to_string())
    }
}

impl From<IngestError> for CliError {
    fn from(e: IngestError) -> Self {
        Self::new(CliErrorCode::IngestError, e.to_string())
    }
}

impl From<ValidatorError> for CliError {
    fn from(e: ValidatorError) -> Self {
        Self::new(CliErrorCode::SchemaError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = CliError::check_failed(1, 3);
        assert_eq!(err.code(), &CliErrorCode::CheckFailed);
        assert_eq!(err.to_string(), "SAMPLECAT_CLI_CHECK_FAILED: 1 of 3 submission(s) did not pass the check");
    }

    #[test]
    fn test_schema_errors_convert() {
        let err: CliError = SchemaError::unknown_field("depth").into();
        assert_eq!(err.code_str(), "SAMPLECAT_CLI_SCHEMA_ERROR");
        assert!(err.message().contains("depth"));
    }
}
