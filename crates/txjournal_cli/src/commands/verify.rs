//! Verify command implementation.

use std::path::Path;
use txjournal_core::frame::FrameReader;
use txjournal_storage::{FileBackend, StorageBackend};

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of intact frames.
    pub valid_frames: usize,
    /// Last LSN seen.
    pub last_lsn: Option<i64>,
    /// Bytes of a partial frame cut off at the end of the file.
    pub torn_tail: u64,
    /// List of errors found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying journal at {:?}", path);
    println!();

    if !path.exists() {
        return Err(format!("journal file not found: {}", path.display()).into());
    }

    let backend = FileBackend::open(path)?;
    let result = verify_frames(&backend)?;
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Journal verification passed");
        Ok(())
    } else {
        println!("✗ Journal verification failed");
        Err("Verification failed".into())
    }
}

fn verify_frames(
    backend: &dyn StorageBackend,
) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let mut result = VerifyResult::default();
    let mut reader = FrameReader::new(backend, 0)?;
    let mut corrupt = false;

    for frame in reader.by_ref() {
        match frame {
            Ok((offset, row)) => {
                if let Some(prev) = result.last_lsn {
                    if row.lsn <= prev {
                        result.errors.push(format!(
                            "LSN out of order at offset {}: {} after {}",
                            offset, row.lsn, prev
                        ));
                    }
                }
                result.last_lsn = Some(row.lsn);
                result.valid_frames += 1;
            }
            Err(err) => {
                corrupt = true;
                result.errors.push(err.to_string());
            }
        }
    }

    if corrupt {
        return Ok(result);
    }
    result.torn_tail = reader.torn_tail();
    if result.torn_tail > 0 {
        tracing::warn!(bytes = result.torn_tail, "journal ends in a partial frame");
    }
    Ok(result)
}

fn print_result(result: &VerifyResult) {
    println!("  valid frames: {}", result.valid_frames);
    match result.last_lsn {
        Some(lsn) => println!("  last LSN: {}", lsn),
        None => println!("  last LSN: none"),
    }
    if result.torn_tail > 0 {
        println!("  partial frame at tail: {} bytes", result.torn_tail);
    }
    for error in &result.errors {
        println!("    ERROR: {}", error);
    }
}
