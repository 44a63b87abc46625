//! Event storage
//!
//! Holds the catalogue of sampling events. The durable store is an
//! append-only, checksummed record log replayed into memory on open.
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates)
//! - Checksum-verified on every read
//! - Halt on corruption
//! - Latest frame wins for the same event id

mod errors;
mod file;
mod frame;
mod memory;
mod reader;
mod record;
mod store;
mod writer;

pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use file::FileStore;
pub use frame::{compute_checksum, EventFrame};
pub use memory::MemoryStore;
pub use reader::LogReader;
pub use record::EventRecord;
pub use store::{DanglingReference, EventStore, StoreLayout};
pub use writer::{log_path, LogWriter};
