//! Storage error types
//!
//! Error codes:
//! - SAMPLECAT_STORAGE_IO_ERROR (ERROR severity)
//! - SAMPLECAT_STORAGE_WRITE_FAILED (ERROR severity)
//! - SAMPLECAT_STORAGE_READ_FAILED (ERROR severity)
//! - SAMPLECAT_STORAGE_UNKNOWN_EVENT (ERROR severity)
//! - SAMPLECAT_STORAGE_INVALID_RECORD (ERROR severity)
//! - SAMPLECAT_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, process continues
    Error,
    /// The event log cannot be trusted; stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure
    IoError,
    /// Record write or fsync failed
    WriteFailed,
    /// Record read failed
    ReadFailed,
    /// No record with the given eventID
    UnknownEvent,
    /// Record violates a record-level rule (self parent, bad body)
    InvalidRecord,
    /// Checksum or framing failure
    DataCorruption,
}

impl StorageErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::IoError => "SAMPLECAT_STORAGE_IO_ERROR",
            StorageErrorCode::WriteFailed => "SAMPLECAT_STORAGE_WRITE_FAILED",
            StorageErrorCode::ReadFailed => "SAMPLECAT_STORAGE_READ_FAILED",
            StorageErrorCode::UnknownEvent => "SAMPLECAT_STORAGE_UNKNOWN_EVENT",
            StorageErrorCode::InvalidRecord => "SAMPLECAT_STORAGE_INVALID_RECORD",
            StorageErrorCode::DataCorruption => "SAMPLECAT_DATA_CORRUPTION",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with full context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StorageError {
    fn with_code(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::with_code(StorageErrorCode::IoError, message)
        }
    }

    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::with_code(StorageErrorCode::WriteFailed, message)
        }
    }

    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::with_code(StorageErrorCode::ReadFailed, message)
        }
    }

    /// No record exists for the identifier
    pub fn unknown_event(event_id: impl fmt::Display) -> Self {
        Self::with_code(
            StorageErrorCode::UnknownEvent,
            format!("No event with id {}", event_id),
        )
    }

    pub fn invalid_record(event_id: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("event_id: {}", event_id)),
            ..Self::with_code(StorageErrorCode::InvalidRecord, reason)
        }
    }

    /// Create a new data corruption error (FATAL)
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self::with_code(StorageErrorCode::DataCorruption, message)
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::with_code(StorageErrorCode::DataCorruption, reason)
        }
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
