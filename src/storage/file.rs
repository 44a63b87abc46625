//! Durable event store
//!
//! Records are kept in memory and every `put` is appended to the event log
//! before the in-memory copy changes. On open the log is replayed; the latest
//! frame per event id wins.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::errors::StorageResult;
use super::memory::{check_record, MemoryStore};
use super::reader::LogReader;
use super::record::EventRecord;
use super::store::{EventStore, StoreLayout};
use super::writer::{log_path, LogWriter};

/// Event store backed by `<data_dir>/data/events.dat`
pub struct FileStore {
    data_dir: PathBuf,
    memory: MemoryStore,
    writer: LogWriter,
    /// Frames in the log, including superseded ones
    frames: usize,
}

impl FileStore {
    /// Opens (creating if needed) the store and replays the log.
    ///
    /// # Errors
    ///
    /// Any corrupt frame is `SAMPLECAT_DATA_CORRUPTION` and the store does
    /// not open.
    pub fn open(data_dir: &Path, layout: StoreLayout) -> StorageResult<Self> {
        let writer = LogWriter::open(data_dir)?;
        let mut memory = MemoryStore::new(layout);
        let mut frames = 0;

        let mut reader = LogReader::open(&log_path(data_dir))?;
        while let Some(record) = reader.read_next()? {
            memory.put(record)?;
            frames += 1;
        }

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            memory,
            writer,
            frames,
        })
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// Number of frames in the log, superseded ones included
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    /// Rewrites the log with only the latest frame per event id
    pub fn compact(&mut self) -> StorageResult<()> {
        self.writer = LogWriter::rewrite(&self.data_dir, self.memory.iter())?;
        self.frames = self.memory.len();
        Ok(())
    }
}

impl EventStore for FileStore {
    fn layout(&self) -> &StoreLayout {
        self.memory.layout()
    }

    fn get(&self, event_id: &Uuid) -> StorageResult<Option<EventRecord>> {
        self.memory.get(event_id)
    }

    fn put(&mut self, record: EventRecord) -> StorageResult<()> {
        check_record(&record)?;
        self.writer.append(&record)?;
        self.frames += 1;
        self.memory.put(record)
    }

    fn records(&self) -> StorageResult<Vec<EventRecord>> {
        self.memory.records()
    }

    fn len(&self) -> usize {
        self.memory.len()
    }

    fn contains(&self, event_id: &Uuid) -> StorageResult<bool> {
        self.memory.contains(event_id)
    }

    fn parent_links(&self) -> StorageResult<Vec<(Uuid, Option<Uuid>)>> {
        self.memory.parent_links()
    }
}
