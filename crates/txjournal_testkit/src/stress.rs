//! Concurrent submission stress helpers.
//!
//! These drive a registry from several threads at once and check that each
//! thread observes its own results in increasing order.

use std::thread;
use std::time::{Duration, Instant};
use txjournal_core::{txn, JournalRegistry, Region};

use crate::fixtures::filled_entry;

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total submissions performed.
    pub total_ops: usize,
    /// Submissions that returned a sequence number.
    pub successful_ops: usize,
    /// Submissions that returned an error.
    pub failed_ops: usize,
    /// Whether every thread saw strictly increasing results.
    pub monotone: bool,
    /// Total duration.
    pub duration: Duration,
    /// Submissions per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    fn new(successful: usize, failed: usize, monotone: bool, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            monotone,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the run.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total submissions: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Monotone: {}", self.monotone);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of submitting threads.
    pub threads: usize,
    /// Entries each thread submits.
    pub entries_per_thread: usize,
    /// Rows per entry.
    pub rows_per_entry: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            entries_per_thread: 1_000,
            rows_per_entry: 2,
        }
    }
}

/// Submits entries with blocking `submit` from `config.threads` threads.
pub fn stress_blocking_submit(registry: &JournalRegistry, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();

    let per_thread: Vec<(usize, usize, bool)> = thread::scope(|scope| {
        let workers: Vec<_> = (0..config.threads)
            .map(|_| {
                scope.spawn(|| {
                    let region = Region::unbounded();
                    let _txn = txn::begin();
                    let mut successful = 0usize;
                    let mut failed = 0usize;
                    let mut monotone = true;
                    let mut last = i64::MIN;

                    for _ in 0..config.entries_per_thread {
                        let mut entry = filled_entry(config.rows_per_entry, &region);
                        entry.bind_completion(|_| {});
                        match registry.submit(entry) {
                            Ok(res) => {
                                monotone &= res > last;
                                last = res;
                                successful += 1;
                            }
                            Err(_) => failed += 1,
                        }
                    }
                    (successful, failed, monotone)
                })
            })
            .collect();

        workers
            .into_iter()
            .map(|worker| worker.join().unwrap_or((0, 0, false)))
            .collect()
    });

    let (successful, failed, monotone) = per_thread.into_iter().fold(
        (0, 0, true),
        |(ok, err, mono), (t_ok, t_err, t_mono)| (ok + t_ok, err + t_err, mono && t_mono),
    );
    StressTestResult::new(successful, failed, monotone, start.elapsed())
}
