//! Benchmarks for raw generation and bounded sampling
//!
//! Run with: cargo bench --bench bounded
//!
//! Compares the nearly-divisionless sampler against the thread-local entry
//! point and against bounds that force the rejection path.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use xoshiro_bounded::{random_uniform, Rng, Xoshiro128StarStar};

const BATCH: u64 = 1024;

fn seeded() -> Xoshiro128StarStar {
    Xoshiro128StarStar::from_state([0x9e37_79b9, 0x7f4a_7c15, 0xf39c_c060, 0x5ced_5e2b])
        .unwrap_or_else(|err| panic!("fixed state rejected: {err}"))
}

fn bench_next_u32(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_u32");
    group.throughput(Throughput::Elements(BATCH));

    group.bench_function("xoshiro128starstar", |b| {
        let mut rng = seeded();
        b.iter(|| {
            for _ in 0..BATCH {
                black_box(rng.next_u32());
            }
        });
    });

    group.finish();
}

fn bench_bounded(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded");
    group.throughput(Throughput::Elements(BATCH));

    // 6 and 1000 almost never reject; 2^31 + 1 rejects about half of all draws.
    for limit in [6u32, 1000, 1 << 20, 0x8000_0001, u32::MAX] {
        group.bench_with_input(BenchmarkId::new("explicit", limit), &limit, |b, &limit| {
            let mut rng = seeded();
            b.iter(|| {
                for _ in 0..BATCH {
                    black_box(rng.bounded(black_box(limit)));
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("thread_local", limit),
            &limit,
            |b, &limit| {
                b.iter(|| {
                    for _ in 0..BATCH {
                        black_box(random_uniform(black_box(limit)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_modulo_baseline(c: &mut Criterion) {
    let mut group = c.benchmark_group("modulo_baseline");
    group.throughput(Throughput::Elements(BATCH));

    // Biased reference point: plain `%` reduction.
    group.bench_function("raw_mod_1000", |b| {
        let mut rng = seeded();
        b.iter(|| {
            for _ in 0..BATCH {
                black_box(rng.next_u32() % black_box(1000));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_next_u32, bench_bounded, bench_modulo_baseline);
criterion_main!(benches);
