//! Append-only event log writer
//!
//! Every append is followed by fsync; a write is not acknowledged until it
//! is durable. There are no in-place updates: a changed record is appended
//! again and the latest frame for an id wins on replay.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::frame::EventFrame;
use super::record::EventRecord;

/// Location of the event log under a data directory
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data").join("events.dat")
}

/// Writer over `<data_dir>/data/events.dat`
pub struct LogWriter {
    log_path: PathBuf,
    file: File,
    current_offset: u64,
}

impl LogWriter {
    /// Opens or creates the event log, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `SAMPLECAT_STORAGE_WRITE_FAILED` if the file cannot be created.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let log_path = log_path(data_dir);
        let data_subdir = data_dir.join("data");

        if !data_subdir.exists() {
            fs::create_dir_all(&data_subdir).map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to create data directory: {}", data_subdir.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| {
                StorageError::write_failed(format!("Failed to open event log: {}", log_path.display()), e)
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            log_path,
            file,
            current_offset,
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Appends a record with fsync, returning the frame's byte offset
    pub fn append(&mut self, record: &EventRecord) -> StorageResult<u64> {
        let frame = EventFrame::from_record(record).map_err(|e| {
            StorageError::invalid_record(record.event_id, format!("Failed to encode record: {}", e))
        })?;
        let bytes = frame.serialize();
        let offset = self.current_offset;

        self.file.write_all(&bytes).map_err(|e| {
            StorageError::write_failed(format!("Failed to write event: {}", record.event_id), e)
        })?;

        self.file.sync_all().map_err(|e| {
            StorageError::write_failed(
                format!("fsync failed after writing event: {}", record.event_id),
                e,
            )
        })?;

        self.current_offset += bytes.len() as u64;
        Ok(offset)
    }

    /// Replaces the log with exactly `records`, written to a temporary file
    /// and renamed over the original.
    pub fn rewrite<'r>(
        data_dir: &Path,
        records: impl IntoIterator<Item = &'r EventRecord>,
    ) -> StorageResult<Self> {
        let target = log_path(data_dir);
        let staging = target.with_extension("dat.compact");

        {
            let mut file = File::create(&staging).map_err(|e| {
                StorageError::write_failed(format!("Failed to create {}", staging.display()), e)
            })?;
            for record in records {
                let frame = EventFrame::from_record(record).map_err(|e| {
                    StorageError::invalid_record(record.event_id, format!("Failed to encode record: {}", e))
                })?;
                file.write_all(&frame.serialize()).map_err(|e| {
                    StorageError::write_failed(format!("Failed to write event: {}", record.event_id), e)
                })?;
            }
            file.sync_all()
                .map_err(|e| StorageError::write_failed("fsync failed during compaction", e))?;
        }

        fs::rename(&staging, &target).map_err(|e| {
            StorageError::write_failed(format!("Failed to replace {}", target.display()), e)
        })?;

        Self::open(data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use uuid::Uuid;

    #[test]
    fn test_creates_log_under_data_dir() {
        let temp = TempDir::new().unwrap();
        let writer = LogWriter::open(temp.path()).unwrap();
        assert!(writer.path().ends_with("data/events.dat"));
        assert!(writer.path().exists());
        assert_eq!(writer.current_offset(), 0);
    }

    #[test]
    fn test_offsets_advance() {
        let temp = TempDir::new().unwrap();
        let mut writer = LogWriter::open(temp.path()).unwrap();
        let first = writer.append(&EventRecord::new(Uuid::new_v4(), None).unwrap()).unwrap();
        let second = writer.append(&EventRecord::new(Uuid::new_v4(), None).unwrap()).unwrap();
        assert_eq!(first, 0);
        assert!(second > first);
        assert_eq!(fs::metadata(writer.path()).unwrap().len(), writer.current_offset());
    }

    #[test]
    fn test_reopen_appends() {
        let temp = TempDir::new().unwrap();
        let end = {
            let mut writer = LogWriter::open(temp.path()).unwrap();
            writer.append(&EventRecord::new(Uuid::new_v4(), None).unwrap()).unwrap();
            writer.current_offset()
        };
        let writer = LogWriter::open(temp.path()).unwrap();
        assert_eq!(writer.current_offset(), end);
    }
}
