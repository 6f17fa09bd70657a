//! Row framing used by the live journal.
//!
//! ## Frame Format
//!
//! ```text
//! | magic (4) | version (2) | replica_id (4) | lsn (8) | length (4) | header crc32 (4) | body (N) | crc32 (4) |
//! ```
//!
//! All integers are little endian. The header CRC covers the 22 bytes
//! before it; the trailing CRC covers every byte before it.
//!
//! ## Reading Back
//!
//! A frame cut short at the end of the store (crash mid-write) ends
//! iteration cleanly: either fewer bytes than a header remain and they
//! start like a frame, or the header is intact and only the body is cut.
//! The length is never trusted before the header CRC matches. A bad magic,
//! unknown version or checksum mismatch anywhere is an error: the journal
//! is corrupt and must not be replayed past that point.

use crate::error::{JournalError, JournalResult};
use crate::row::RowHeader;
use txjournal_storage::StorageBackend;

/// Magic bytes opening every frame.
pub const FRAME_MAGIC: [u8; 4] = *b"TXJR";

/// Current frame version.
pub const FRAME_VERSION: u16 = 2;

/// magic (4) + version (2) + replica_id (4) + lsn (8) + length (4)
const HEADER_FIELDS_SIZE: usize = 22;

const CRC_SIZE: usize = 4;

/// Header fields plus the header CRC.
pub const FRAME_HEADER_SIZE: usize = HEADER_FIELDS_SIZE + CRC_SIZE;

/// Bytes a frame adds around its body.
pub const FRAME_OVERHEAD: usize = FRAME_HEADER_SIZE + CRC_SIZE;

/// Encodes `row` as a frame carrying `lsn`.
///
/// # Errors
///
/// Returns [`JournalError::Corrupted`] if the body does not fit a `u32`
/// length.
pub fn encode_frame(row: &RowHeader, replica_id: u32, lsn: i64) -> JournalResult<Vec<u8>> {
    let len = u32::try_from(row.body.len())
        .map_err(|_| JournalError::corrupted(0, "row body exceeds 4 GiB"))?;

    let mut frame = Vec::with_capacity(FRAME_OVERHEAD + row.body.len());
    frame.extend_from_slice(&FRAME_MAGIC);
    frame.extend_from_slice(&FRAME_VERSION.to_le_bytes());
    frame.extend_from_slice(&replica_id.to_le_bytes());
    frame.extend_from_slice(&lsn.to_le_bytes());
    frame.extend_from_slice(&len.to_le_bytes());
    let header_crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&header_crc.to_le_bytes());
    frame.extend_from_slice(&row.body);
    let crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&crc.to_le_bytes());
    Ok(frame)
}

fn le_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

/// Iterates the frames of a store, yielding `(offset, row)` pairs.
pub struct FrameReader<'a> {
    store: &'a dyn StorageBackend,
    offset: u64,
    size: u64,
    torn_tail: u64,
    finished: bool,
}

impl<'a> FrameReader<'a> {
    /// Starts reading `store` at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store size cannot be read.
    pub fn new(store: &'a dyn StorageBackend, offset: u64) -> JournalResult<Self> {
        Ok(Self {
            store,
            offset,
            size: store.size()?,
            torn_tail: 0,
            finished: false,
        })
    }

    /// Offset just past the last frame returned.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.offset
    }

    /// Bytes of the partial frame the store ends with.
    ///
    /// Zero until iteration has ended cleanly at a torn final frame. When
    /// non-zero, `position() + torn_tail()` is the end of the store.
    #[must_use]
    pub fn torn_tail(&self) -> u64 {
        self.torn_tail
    }

    fn end_torn(&mut self, start: u64, remaining: u64) -> JournalResult<Option<(u64, RowHeader)>> {
        tracing::debug!(offset = start, bytes = remaining, "truncated frame at journal tail");
        self.torn_tail = remaining;
        Ok(None)
    }

    fn read_frame(&mut self) -> JournalResult<Option<(u64, RowHeader)>> {
        let start = self.offset;
        let remaining = self.size.saturating_sub(start);
        if remaining == 0 {
            return Ok(None);
        }

        if remaining < FRAME_HEADER_SIZE as u64 {
            let partial = self.store.read_at(start, remaining as usize)?;
            let prefix = partial.len().min(FRAME_MAGIC.len());
            if partial[..prefix] != FRAME_MAGIC[..prefix] {
                return Err(JournalError::corrupted(start, "bad frame magic"));
            }
            return self.end_torn(start, remaining);
        }

        let header = self.store.read_at(start, FRAME_HEADER_SIZE)?;
        if header[0..4] != FRAME_MAGIC {
            return Err(JournalError::corrupted(start, "bad frame magic"));
        }
        let stored_header_crc = le_u32(&header[HEADER_FIELDS_SIZE..]);
        let header_crc = crc32fast::hash(&header[..HEADER_FIELDS_SIZE]);
        if stored_header_crc != header_crc {
            return Err(JournalError::ChecksumMismatch {
                offset: start,
                expected: stored_header_crc,
                actual: header_crc,
            });
        }
        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != FRAME_VERSION {
            return Err(JournalError::corrupted(
                start,
                format!("unsupported frame version {version}"),
            ));
        }
        let replica_id = le_u32(&header[6..10]);
        let mut lsn = [0u8; 8];
        lsn.copy_from_slice(&header[10..18]);
        let lsn = i64::from_le_bytes(lsn);
        let len = le_u32(&header[18..22]) as usize;

        let frame_len = (FRAME_OVERHEAD + len) as u64;
        if remaining < frame_len {
            // The header is intact, so the frame really does extend past
            // the end of the store.
            return self.end_torn(start, remaining);
        }

        let rest = self.store.read_at(start + FRAME_HEADER_SIZE as u64, len + CRC_SIZE)?;
        let (body, stored) = rest.split_at(len);
        let expected = le_u32(stored);
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&header);
        hasher.update(body);
        let actual = hasher.finalize();
        if expected != actual {
            return Err(JournalError::ChecksumMismatch {
                offset: start,
                expected,
                actual,
            });
        }

        self.offset = start + frame_len;
        Ok(Some((start, RowHeader::logged(replica_id, lsn, body.to_vec()))))
    }
}

impl Iterator for FrameReader<'_> {
    type Item = JournalResult<(u64, RowHeader)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
