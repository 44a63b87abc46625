//! On-disk frame format of the event log
//!
//! ```text
//! +------------------+
//! | Frame Length     | (u32 LE, whole frame)
//! +------------------+
//! | Event ID         | (length-prefixed string)
//! +------------------+
//! | Record Body      | (length-prefixed JSON)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32)
//! +------------------+
//! ```
//!
//! The checksum covers every byte before it, including the length.

use std::io;

use crc32fast::Hasher;

use super::record::EventRecord;

/// Smallest possible frame: length + two empty strings + checksum
pub const MIN_FRAME_SIZE: usize = 4 + 4 + 4 + 4;

/// CRC32 (IEEE) over `data`
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// One framed record
#[derive(Debug, Clone, PartialEq)]
pub struct EventFrame {
    pub event_id: String,
    pub body: Vec<u8>,
}

impl EventFrame {
    /// Frame a record, serializing its body as JSON
    pub fn from_record(record: &EventRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id: record.event_id.to_string(),
            body: serde_json::to_vec(record)?,
        })
    }

    /// Decode the JSON body
    pub fn record(&self) -> Result<EventRecord, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn serialize(&self) -> Vec<u8> {
        let frame_length = (4 + 4 + self.event_id.len() + 4 + self.body.len() + 4) as u32;

        let mut frame = Vec::with_capacity(frame_length as usize);
        frame.extend_from_slice(&frame_length.to_le_bytes());
        frame.extend_from_slice(&(self.event_id.len() as u32).to_le_bytes());
        frame.extend_from_slice(self.event_id.as_bytes());
        frame.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        frame.extend_from_slice(&self.body);

        let checksum = compute_checksum(&frame);
        frame.extend_from_slice(&checksum.to_le_bytes());
        frame
    }

    /// Parse one frame, verifying its checksum.
    ///
    /// Returns the frame and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_FRAME_SIZE {
            return Err(invalid(io::ErrorKind::UnexpectedEof, "Frame too short"));
        }

        let frame_length = read_u32(data, 0)? as usize;
        if frame_length < MIN_FRAME_SIZE || frame_length > data.len() {
            return Err(invalid(
                io::ErrorKind::InvalidData,
                format!("Invalid frame length: {}", frame_length),
            ));
        }

        let payload_end = frame_length - 4;
        let stored = read_u32(data, payload_end)?;
        let computed = compute_checksum(&data[..payload_end]);
        if stored != computed {
            return Err(invalid(
                io::ErrorKind::InvalidData,
                format!("Checksum mismatch: stored {:08x}, computed {:08x}", stored, computed),
            ));
        }

        let mut cursor = 4;
        let event_id = read_prefixed(data, &mut cursor, payload_end)?;
        let event_id = String::from_utf8(event_id)
            .map_err(|_| invalid(io::ErrorKind::InvalidData, "Event id is not UTF-8"))?;
        let body = read_prefixed(data, &mut cursor, payload_end)?;

        if cursor != payload_end {
            return Err(invalid(io::ErrorKind::InvalidData, "Trailing bytes inside frame"));
        }

        Ok((Self { event_id, body }, frame_length))
    }
}

fn invalid(kind: io::ErrorKind, message: impl Into<String>) -> io::Error {
    io::Error::new(kind, message.into())
}

fn read_u32(data: &[u8], at: usize) -> io::Result<u32> {
    data.get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| invalid(io::ErrorKind::UnexpectedEof, "Truncated frame"))
}

fn read_prefixed(data: &[u8], cursor: &mut usize, end: usize) -> io::Result<Vec<u8>> {
    let len = read_u32(data, *cursor)? as usize;
    let start = *cursor + 4;
    let stop = start
        .checked_add(len)
        .filter(|stop| *stop <= end)
        .ok_or_else(|| invalid(io::ErrorKind::InvalidData, "Field length exceeds frame"))?;
    *cursor = stop;
    Ok(data[start..stop].to_vec())
}
