//! Dump command implementation.

use serde::Serialize;
use std::path::Path;
use txjournal_core::frame::FrameReader;
use txjournal_storage::FileBackend;

/// Bytes of each row body shown in the listing.
const PREVIEW_LEN: usize = 16;

/// Frame representation for output.
#[derive(Debug, Serialize)]
pub struct FrameInfo {
    /// Offset in the journal file.
    pub offset: u64,
    /// Log sequence number.
    pub lsn: i64,
    /// Replica that wrote the row.
    pub replica_id: u32,
    /// Body size in bytes.
    pub body_len: usize,
    /// Leading body bytes, hex-encoded.
    pub preview: String,
}

/// Runs the dump command.
pub fn run(
    path: &Path,
    limit: Option<usize>,
    start_offset: u64,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("journal file not found: {}", path.display()).into());
    }

    let backend = FileBackend::open(path)?;
    let frames = read_frames(&backend, start_offset, limit)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&frames)?);
        }
        _ => {
            print_text_output(&frames);
        }
    }

    Ok(())
}

fn read_frames(
    backend: &FileBackend,
    start_offset: u64,
    limit: Option<usize>,
) -> Result<Vec<FrameInfo>, Box<dyn std::error::Error>> {
    let mut frames = Vec::new();
    let reader = FrameReader::new(backend, start_offset)?;

    for frame in reader.take(limit.unwrap_or(usize::MAX)) {
        let (offset, row) = frame?;
        frames.push(FrameInfo {
            offset,
            lsn: row.lsn,
            replica_id: row.replica_id,
            body_len: row.body.len(),
            preview: hex_preview(&row.body),
        });
    }

    Ok(frames)
}

fn hex_preview(body: &[u8]) -> String {
    let mut out: String = body
        .iter()
        .take(PREVIEW_LEN)
        .map(|b| format!("{b:02x}"))
        .collect();
    if body.len() > PREVIEW_LEN {
        out.push_str("..");
    }
    out
}

fn print_text_output(frames: &[FrameInfo]) {
    println!("{:>10}  {:>10}  {:>7}  {:>8}  body", "offset", "lsn", "replica", "len");
    for frame in frames {
        println!(
            "{:>10}  {:>10}  {:>7}  {:>8}  {}",
            frame.offset, frame.lsn, frame.replica_id, frame.body_len, frame.preview
        );
    }
    println!("\n{} frame(s)", frames.len());
}
