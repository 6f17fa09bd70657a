//! Frame codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use txjournal_bench::payload;
use txjournal_core::frame::{encode_frame, FrameReader};
use txjournal_core::RowHeader;
use txjournal_storage::{InMemoryBackend, StorageBackend};

/// Benchmark framing a single row.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_encode");

    for size in [64, 256, 1024, 4096].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let row = RowHeader::new(payload(size));
            b.iter(|| {
                let frame = encode_frame(black_box(&row), 1, 42).unwrap();
                black_box(frame);
            });
        });
    }

    group.finish();
}

/// Benchmark reading back a journal of framed rows.
fn bench_read_back(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_read_back");

    for count in [100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut store = InMemoryBackend::new();
            let row = RowHeader::new(payload(256));
            for lsn in 1..=count as i64 {
                store.append(&encode_frame(&row, 1, lsn).unwrap()).unwrap();
            }

            b.iter(|| {
                let frames = FrameReader::new(&store, 0).unwrap().count();
                black_box(frames);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_read_back);
criterion_main!(benches);
