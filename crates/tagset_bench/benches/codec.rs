//! Wire codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tagset_bench::{blob_record, flat_record, nested_record};
use tagset_codec::{from_wire, to_wire, RecordEncoder, RecordView};

/// Benchmark encoding records of increasing width.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for pairs in [1, 8, 64, 512].iter() {
        let record = flat_record(*pairs).unwrap();
        group.throughput(Throughput::Bytes(record.total_bytes()));
        group.bench_with_input(BenchmarkId::new("flat", pairs), &record, |b, record| {
            b.iter(|| {
                let result = to_wire(black_box(record)).unwrap();
                black_box(result);
            });
        });
    }

    group.bench_function("nested_depth8", |b| {
        let record = nested_record(8, 4).unwrap();
        b.iter(|| {
            let result = to_wire(black_box(&record)).unwrap();
            black_box(result);
        });
    });

    group.finish();
}

/// Benchmark decoding blobs of varying sizes.
fn bench_decode_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_size");

    for size in [64, 256, 1024, 4096, 16384].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let encoded = to_wire(&blob_record(size).unwrap()).unwrap();
            b.iter(|| {
                let result = from_wire(black_box(&encoded)).unwrap();
                black_box(result);
            });
        });
    }

    group.finish();
}

/// Benchmark owned decoding against the borrowed view.
fn bench_decode_vs_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let encoded = to_wire(&flat_record(64).unwrap()).unwrap();

    group.bench_function("decode_then_get", |b| {
        b.iter(|| {
            let record = from_wire(black_box(&encoded)).unwrap();
            black_box(record.get_named("field_63").is_some());
        });
    });

    group.bench_function("view_get", |b| {
        b.iter(|| {
            let view = RecordView::parse(black_box(&encoded)).unwrap();
            black_box(view.get_named("field_63").is_some());
        });
    });

    group.finish();
}

/// Benchmark encoder buffer reuse.
fn bench_encoder_reuse(c: &mut Criterion) {
    c.bench_function("encode_into_reuse_100", |b| {
        let records: Vec<_> = (0..100).map(|_| flat_record(4).unwrap()).collect();
        let encoder = RecordEncoder::new();
        let mut buffer = Vec::new();

        b.iter(|| {
            buffer.clear();
            for record in &records {
                encoder.encode_into(black_box(record), &mut buffer).unwrap();
            }
            black_box(buffer.len());
        });
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode_size,
    bench_decode_vs_view,
    bench_encoder_reuse,
);

criterion_main!(benches);
