//! Interner benchmarks
//!
//! These benchmarks measure lookup and find-or-create against the static
//! root and the dynamic pools.
//! Run with: `cargo bench --bench intern_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use istr::{compute_hash, HashWidth, Interner, InternerConfig, StaticTable};

/// Benchmark find-or-create hits and misses
fn bench_intern(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern");
    group.throughput(Throughput::Elements(1));

    group.bench_function("intern_new_string", |b| {
        let mut interner = Interner::new();
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            interner.intern_str(&format!("new_string_{}", counter))
        })
    });

    group.bench_function("intern_existing_string", |b| {
        let mut interner = Interner::new();
        interner.intern(b"existing_string").unwrap();
        b.iter(|| black_box(interner.intern(black_box(b"existing_string"))))
    });

    group.bench_function("intern_builtin_name", |b| {
        let mut interner = Interner::new();
        b.iter(|| black_box(interner.intern(black_box(b"__init__"))))
    });

    group.finish();
}

/// Benchmark lookups as the dynamic pools fill up
fn bench_find_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_scaling");

    for size in [10usize, 100, 1000, 10000] {
        let mut interner = Interner::new();
        for i in 0..size {
            interner.intern_str(&format!("symbol_{}", i)).unwrap();
        }
        let oldest = b"symbol_0".to_vec();

        group.bench_with_input(BenchmarkId::new("oldest_entry", size), &size, |b, _| {
            b.iter(|| black_box(interner.find(black_box(&oldest))))
        });
        group.bench_with_input(BenchmarkId::new("miss", size), &size, |b, _| {
            b.iter(|| black_box(interner.find(black_box(b"not_there"))))
        });
    }

    group.finish();
}

/// Benchmark handle resolution
fn bench_content(c: &mut Criterion) {
    let mut group = c.benchmark_group("content");
    group.throughput(Throughput::Elements(1));

    let config = InternerConfig {
        initial_pool_entries: 4,
        ..Default::default()
    };
    let mut interner = Interner::with_config(StaticTable::EMPTY, config).unwrap();
    let handles: Vec<_> = (0..4096)
        .map(|i| interner.intern_str(&format!("entry_{}", i)).unwrap())
        .collect();

    group.bench_function("newest", |b| {
        let h = handles[handles.len() - 1];
        b.iter(|| black_box(interner.content(black_box(h))))
    });
    group.bench_function("oldest", |b| {
        let h = handles[0];
        b.iter(|| black_box(interner.content(black_box(h))))
    });

    group.finish();
}

/// Benchmark the content hash
fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("hash");

    for len in [4usize, 16, 64, 255] {
        let bytes = vec![b'h'; len];
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &bytes, |b, bytes| {
            b.iter(|| black_box(compute_hash(black_box(bytes), HashWidth::Two)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_intern,
    bench_find_scaling,
    bench_content,
    bench_hash
);
criterion_main!(benches);
