//! Counting filter benchmarks
//!
//! # Scenarios
//!
//! 1. **Add / contains / remove by size**: 1K to 1M keys at 1% FPR
//! 2. **By error rate**: lower error rate means more probes per key
//! 3. **Hashers**: Murmur3 against XXH3 on short and long keys
//! 4. **Estimate**: `estimate_count` is O(1) thanks to the tracked nonzero count
//! 5. **Persistence**: save + load of a populated filter

use countbloom::hash::Murmur3Hasher;
use countbloom::{CountingBloomFilter, FilterConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

const SIZES: &[usize] = &[1_000, 10_000, 100_000, 1_000_000];
const ERROR_RATES: &[f64] = &[0.1, 0.01, 0.001, 0.0001];

fn random_string(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn generate_strings(count: usize, len: usize) -> Vec<String> {
    (0..count).map(|_| random_string(len)).collect()
}

fn populated(capacity: usize, error_rate: f64, keys: &[String]) -> CountingBloomFilter {
    let mut filter = CountingBloomFilter::new(capacity, error_rate).unwrap();
    for key in keys {
        filter.insert(key);
    }
    filter
}

fn bench_add_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_by_size");

    for &size in SIZES {
        let keys = generate_strings(size.min(100_000), 32);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut filter = CountingBloomFilter::new(size, 0.01).unwrap();
            let mut idx = 0;
            b.iter(|| {
                filter.insert(black_box(&keys[idx % keys.len()]));
                idx += 1;
            });
        });
    }

    group.finish();
}

fn bench_contains_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains_by_size");

    for &size in SIZES {
        let keys = generate_strings(size.min(100_000), 32);
        let filter = populated(size, 0.01, &keys);
        let misses = generate_strings(1_000, 32);

        group.throughput(Throughput::Elements(1));
        group.bench_function(BenchmarkId::new("hit", size), |b| {
            let mut idx = 0;
            b.iter(|| {
                let hit = filter.contains(black_box(&keys[idx % keys.len()]));
                idx += 1;
                hit
            });
        });
        group.bench_function(BenchmarkId::new("miss", size), |b| {
            let mut idx = 0;
            b.iter(|| {
                let hit = filter.contains(black_box(&misses[idx % misses.len()]));
                idx += 1;
                hit
            });
        });
    }

    group.finish();
}

fn bench_add_remove_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_remove_cycle");

    for &size in &SIZES[..3] {
        let keys = generate_strings(size, 32);
        let mut filter = populated(size, 0.01, &keys);

        group.throughput(Throughput::Elements(2));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut idx = 0;
            b.iter(|| {
                let key = &keys[idx % keys.len()];
                filter.insert(black_box(key));
                let removed = filter.delete(black_box(key));
                idx += 1;
                removed
            });
        });
    }

    group.finish();
}

fn bench_by_error_rate(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_by_error_rate");
    let size = 100_000;
    let keys = generate_strings(size, 32);

    for &error_rate in ERROR_RATES {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(error_rate),
            &error_rate,
            |b, &error_rate| {
                let mut filter = CountingBloomFilter::new(size, error_rate).unwrap();
                let mut idx = 0;
                b.iter(|| {
                    filter.insert(black_box(&keys[idx % keys.len()]));
                    idx += 1;
                });
            },
        );
    }

    group.finish();
}

fn bench_hashers(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashers");

    for len in [16, 256, 4096] {
        let keys = generate_strings(1_000, len);
        group.throughput(Throughput::Bytes(len as u64));

        group.bench_function(BenchmarkId::new("murmur3", len), |b| {
            let filter =
                CountingBloomFilter::with_hasher(FilterConfig::new(100_000), Murmur3Hasher::new())
                    .unwrap();
            let mut idx = 0;
            b.iter(|| {
                let indexes = filter.indexes_for(black_box(&keys[idx % keys.len()]));
                idx += 1;
                indexes
            });
        });

        #[cfg(feature = "xxhash")]
        group.bench_function(BenchmarkId::new("xxh3", len), |b| {
            let filter = CountingBloomFilter::with_hasher(
                FilterConfig::new(100_000),
                countbloom::hash::XxHasher::new(),
            )
            .unwrap();
            let mut idx = 0;
            b.iter(|| {
                let indexes = filter.indexes_for(black_box(&keys[idx % keys.len()]));
                idx += 1;
                indexes
            });
        });
    }

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let keys = generate_strings(50_000, 16);
    let filter = populated(100_000, 0.01, &keys);

    c.bench_function("estimate_count", |b| {
        b.iter(|| black_box(&filter).estimate_count().unwrap());
    });
}

fn bench_persistence(c: &mut Criterion) {
    let mut group = c.benchmark_group("persistence");
    group.sample_size(20);

    for &size in &SIZES[..3] {
        let keys = generate_strings(size, 16);
        let filter = populated(size, 0.01, &keys);
        let dir = tempfile::tempdir().unwrap();

        group.throughput(Throughput::Bytes(filter.array_length() as u64));
        group.bench_with_input(BenchmarkId::new("save", size), &size, |b, _| {
            b.iter(|| filter.save(dir.path()).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("load", size), &size, |b, _| {
            b.iter(|| CountingBloomFilter::load(dir.path()).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_add_by_size,
    bench_contains_by_size,
    bench_add_remove_cycle,
    bench_by_error_rate,
    bench_hashers,
    bench_estimate,
    bench_persistence,
);

criterion_main!(benches);
