//! Row headers carried by journal entries.

use crate::frame::FRAME_OVERHEAD;
use std::fmt;

/// One logged row change.
///
/// Rows are built by transaction code and shared with the journal through
/// `Arc`, so the backend can read them without copying and without being
/// able to change them. `lsn` is zero for freshly produced rows; rows read
/// back from a journal carry the LSN they were written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHeader {
    /// Id of the replica that produced the row.
    pub replica_id: u32,
    /// Log sequence number of the row, 0 if not yet assigned.
    pub lsn: i64,
    /// Encoded row body, opaque to the journal.
    pub body: Vec<u8>,
}

impl RowHeader {
    /// Creates a row that has not been logged yet.
    #[must_use]
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            replica_id: 0,
            lsn: 0,
            body,
        }
    }

    /// Creates a row as recovered from a journal.
    #[must_use]
    pub fn logged(replica_id: u32, lsn: i64, body: Vec<u8>) -> Self {
        Self {
            replica_id,
            lsn,
            body,
        }
    }

    /// Size of this row once framed.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.body.len()
    }
}

impl fmt::Display for RowHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row{{replica:{} lsn:{} len:{}}}",
            self.replica_id,
            self.lsn,
            self.body.len()
        )
    }
}
