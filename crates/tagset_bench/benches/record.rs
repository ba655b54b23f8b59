//! In-memory record benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tagset_bench::{field_names, flat_record};
use tagset_codec::{Entity, Record};

/// Benchmark building records pair by pair.
fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("put");

    for pairs in [8, 64, 256].iter() {
        let names = field_names(*pairs);
        group.bench_with_input(BenchmarkId::from_parameter(pairs), &names, |b, names| {
            b.iter(|| {
                let mut record = Record::new();
                for name in names {
                    record
                        .put_named(name, Entity::item(1u32).unwrap())
                        .unwrap();
                }
                black_box(record);
            });
        });
    }

    group.finish();
}

/// Benchmark lookups by name.
fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for pairs in [8, 64, 256].iter() {
        let record = flat_record(*pairs).unwrap();
        let last = format!("field_{}", pairs - 1);
        group.bench_with_input(BenchmarkId::new("last", pairs), &record, |b, record| {
            b.iter(|| black_box(record.get_named(black_box(&last)).is_some()));
        });
    }

    group.finish();
}

/// Benchmark delete followed by re-insert.
fn bench_delete(c: &mut Criterion) {
    c.bench_function("delete_reinsert_64", |b| {
        let mut record = flat_record(64).unwrap();
        let key = Entity::string("field_0").unwrap();

        b.iter(|| {
            let value = record.delete(black_box(&key)).unwrap();
            record.put(key.clone(), value).unwrap();
        });
    });
}

criterion_group!(benches, bench_put, bench_get, bench_delete);

criterion_main!(benches);
