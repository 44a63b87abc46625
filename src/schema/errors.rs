//! Schema error types
//!
//! Error codes:
//! - SAMPLECAT_SCHEMA_UNKNOWN_FIELD (REJECT)
//! - SAMPLECAT_SCHEMA_DUPLICATE_FIELD (FATAL)
//! - SAMPLECAT_SCHEMA_INVALID_FIELD (FATAL)
//! - SAMPLECAT_SCHEMA_MALFORMED_FILE (FATAL)
//!
//! Everything except an unknown-field lookup is a configuration error that
//! surfaces when the registry is built and cannot be recovered at runtime.

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The lookup or request is rejected, the process carries on
    Reject,
    /// The field catalogue is unusable
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Field name not present in the registry
    UnknownField,
    /// Two specs share a name
    DuplicateField,
    /// A spec violates a structural rule (weak without inherit, empty list, ...)
    InvalidField,
    /// Schema file unreadable or not valid JSON
    MalformedFile,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownField => "SAMPLECAT_SCHEMA_UNKNOWN_FIELD",
            SchemaErrorCode::DuplicateField => "SAMPLECAT_SCHEMA_DUPLICATE_FIELD",
            SchemaErrorCode::InvalidField => "SAMPLECAT_SCHEMA_INVALID_FIELD",
            SchemaErrorCode::MalformedFile => "SAMPLECAT_SCHEMA_MALFORMED_FILE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::UnknownField => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Field name if applicable
    field: Option<String>,
}

impl SchemaError {
    /// Create an unknown field error
    pub fn unknown_field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: SchemaErrorCode::UnknownField,
            message: format!("Field '{}' is not defined in the schema", name),
            field: Some(name),
        }
    }

    /// Create a duplicate field error
    pub fn duplicate_field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: SchemaErrorCode::DuplicateField,
            message: format!("Field '{}' is defined more than once", name),
            field: Some(name),
        }
    }

    /// Create an invalid field definition error
    pub fn invalid_field(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: SchemaErrorCode::InvalidField,
            message: format!("Invalid definition for field '{}': {}", name, reason.into()),
            field: Some(name),
        }
    }

    /// Create an error for a malformed schema file
    pub fn malformed_file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::MalformedFile,
            message: format!("Malformed schema file '{}': {}", path.into(), reason.into()),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns whether this is a configuration error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::UnknownField.code(), "SAMPLECAT_SCHEMA_UNKNOWN_FIELD");
        assert_eq!(SchemaErrorCode::DuplicateField.code(), "SAMPLECAT_SCHEMA_DUPLICATE_FIELD");
        assert_eq!(SchemaErrorCode::InvalidField.code(), "SAMPLECAT_SCHEMA_INVALID_FIELD");
        assert_eq!(SchemaErrorCode::MalformedFile.code(), "SAMPLECAT_SCHEMA_MALFORMED_FILE");
    }

    #[test]
    fn test_only_lookup_is_recoverable() {
        assert!(!SchemaError::unknown_field("x").is_fatal());
        assert!(SchemaError::duplicate_field("x").is_fatal());
        assert!(SchemaError::invalid_field("x", "bad").is_fatal());
        assert!(SchemaError::malformed_file("a.json", "bad").is_fatal());
    }

    #[test]
    fn test_display_includes_code_and_field() {
        let err = SchemaError::duplicate_field("eventDate");
        let display = format!("{}", err);
        assert!(display.contains("FATAL"));
        assert!(display.contains("SAMPLECAT_SCHEMA_DUPLICATE_FIELD"));
        assert!(display.contains("eventDate"));
        assert_eq!(err.field(), Some("eventDate"));
    }
}
