//! Benchmarks for distributing samples to subscribers
//!
//! Measures:
//! - Publish cost with no subscribers (samples discarded)
//! - Publish plus receive across 1, 4 and 16 subscribers
//! - Publishing into a full buffer (oldest samples dropped)
//!
//! Platform: Cross-platform (in-process channels, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rallywire::Distributor;
use rallywire::test_utils::stage_sample;
use std::hint::black_box;

fn bench_publish(c: &mut Criterion) {
    let sample = stage_sample(1.0);

    let mut group = c.benchmark_group("publish");

    let distributor = Distributor::default();
    group.bench_function("no_subscribers", |b| {
        b.iter(|| black_box(distributor.publish(black_box(sample))))
    });

    // Nobody reads, so every publish past capacity overwrites the oldest
    let lagging = Distributor::new(64);
    let _idle = lagging.subscribe();
    group.bench_function("full_buffer", |b| {
        b.iter(|| black_box(lagging.publish(black_box(sample))))
    });

    group.finish();
}

fn bench_fanout(c: &mut Criterion) {
    let sample = stage_sample(1.0);

    let mut group = c.benchmark_group("fanout");
    group.throughput(Throughput::Elements(1));

    for subscribers in [1usize, 4, 16] {
        let distributor = Distributor::new(64);
        let mut subscriptions: Vec<_> = (0..subscribers).map(|_| distributor.subscribe()).collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, _| {
                b.iter(|| {
                    distributor.publish(black_box(sample));
                    for subscription in subscriptions.iter_mut() {
                        black_box(subscription.try_recv());
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_publish, bench_fanout);
criterion_main!(benches);
