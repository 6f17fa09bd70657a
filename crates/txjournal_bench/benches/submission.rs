//! Submission path benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tempfile::TempDir;
use txjournal_bench::entry;
use txjournal_core::{
    txn, CounterJournal, JournalRegistry, LiveJournal, LiveJournalConfig, Region,
};
use txjournal_storage::{FileBackend, InMemoryBackend};

/// Benchmark blocking submission against the in-memory counter.
fn bench_counter_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter_submit");

    for rows in [1, 8, 64].iter() {
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), rows, |b, &rows| {
            let registry = JournalRegistry::with_journal(Arc::new(CounterJournal::new(0)));
            let region = Region::unbounded();
            let _txn = txn::begin();

            b.iter(|| {
                let res = registry.submit(entry(rows, 64, &region)).unwrap();
                black_box(res);
            });
        });
    }

    group.finish();
}

/// Benchmark blocking submission through the live writer thread.
fn bench_live_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("live_submit_memory");

    for size in [64, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let live = LiveJournal::start(
                Box::new(InMemoryBackend::new()),
                LiveJournalConfig::default(),
            )
            .unwrap();
            let registry = JournalRegistry::with_journal(Arc::new(live));
            let region = Region::unbounded();
            let _txn = txn::begin();

            b.iter(|| {
                let res = registry.submit(entry(1, size, &region)).unwrap();
                black_box(res);
            });

            registry.shutdown();
        });
    }

    group.finish();
}

/// Benchmark asynchronous submission, letting the writer batch.
fn bench_live_async_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("live_async_burst_file");
    group.sample_size(20);

    for burst in [16, 256].iter() {
        group.throughput(Throughput::Elements(*burst as u64));
        group.bench_with_input(BenchmarkId::from_parameter(burst), burst, |b, &burst| {
            let dir = TempDir::new().unwrap();
            let file = FileBackend::open(&dir.path().join("bench.txj")).unwrap();
            let live = Arc::new(
                LiveJournal::start(Box::new(file), LiveJournalConfig::default()).unwrap(),
            );
            let registry = JournalRegistry::with_journal(live.clone());
            let region = Region::unbounded();
            let _txn = txn::begin();

            b.iter(|| {
                for _ in 0..burst - 1 {
                    registry
                        .submit_async(entry(1, 128, &region), |_| {})
                        .unwrap();
                }
                // The last blocking submit waits for the whole burst.
                black_box(registry.submit(entry(1, 128, &region)).unwrap());
            });

            registry.shutdown();
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_counter_submit,
    bench_live_submit,
    bench_live_async_burst,
);
criterion_main!(benches);
