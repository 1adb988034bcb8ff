//! Per-tick hot path benchmarks.
//!
//! Every tick rebuilds the GC histograms and pushes one sample per metric,
//! so these run once per instance per tick.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::Value;
use varmon_lib::metrics::{
    DistributionHistogram, GcIntervals, GcPauses, HistoryBuffer, Sample, DEFAULT_CAPACITY,
};

const PAUSE_NS: &str = include_str!("../tests/fixtures/pause_ns.json");
const PAUSE_END: &str = include_str!("../tests/fixtures/pause_end.json");

fn fixture(raw: &str) -> Value {
    serde_json::from_str(raw).expect("fixture is valid JSON")
}

/// Histogram insertion with compaction at different bin caps
fn bench_histogram_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram_add");
    let samples: Vec<u64> = (0..256u64).map(|i| (i * 7919) % 100_000 + 50_000).collect();

    for bins in [10, 20, 50] {
        group.bench_with_input(BenchmarkId::new("bins", bins), &bins, |b, &bins| {
            b.iter(|| {
                let mut hist = DistributionHistogram::new(bins);
                for value in &samples {
                    hist.add(black_box(*value));
                }
                black_box(hist.mean());
            });
        });
    }

    group.finish();
}

/// Full GC buffer reconstruction from decoded JSON
fn bench_gc_reconstruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("gc_reconstruction");
    let pause_ns = fixture(PAUSE_NS);
    let pause_end = fixture(PAUSE_END);

    group.bench_function("pauses", |b| {
        let mut pauses = GcPauses::default();
        b.iter(|| {
            pauses.set(black_box(&pause_ns));
            black_box(pauses.mean());
        });
    });

    group.bench_function("intervals", |b| {
        let mut intervals = GcIntervals::default();
        b.iter(|| {
            intervals.set(black_box(&pause_end));
            black_box(intervals.mean());
        });
    });

    group.finish();
}

/// History push once the ring has wrapped
fn bench_history_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_push");

    group.bench_function("wrapped_int", |b| {
        let mut history = HistoryBuffer::new(DEFAULT_CAPACITY);
        for i in 0..DEFAULT_CAPACITY {
            history.push(Sample::Int(i64::try_from(i).unwrap_or_default()));
        }
        let mut counter = 0i64;
        b.iter(|| {
            counter += 1;
            history.push(black_box(Sample::Int(counter)));
        });
    });

    group.bench_function("int_values", |b| {
        let mut history = HistoryBuffer::new(DEFAULT_CAPACITY);
        for i in 0..DEFAULT_CAPACITY * 2 {
            history.push(Sample::Float(f64::from(u32::try_from(i).unwrap_or_default()) / 10.0));
        }
        b.iter(|| black_box(history.int_values()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_histogram_add,
    bench_gc_reconstruction,
    bench_history_push
);
criterion_main!(benches);
