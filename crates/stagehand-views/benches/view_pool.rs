//! Benchmarks for pooled view acquisition

use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use stagehand_test_utils::NullHost;
use stagehand_views::{ObjectPool, View, ViewCore};

#[derive(Clone, Default)]
struct Panel {
    core: ViewCore,
}

impl View for Panel {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }
}

fn bench_cold_acquire(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_cold_acquire");

    for count in [10, 100, 1000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let template = Panel::default();
            b.iter(|| {
                let mut pool = ObjectPool::new(Rc::new(NullHost::new()));
                for _ in 0..count {
                    black_box(pool.acquire(Some(&template)));
                }
            });
        });
    }

    group.finish();
}

fn bench_warm_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_warm_round_trip");

    for count in [10, 100, 1000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let template = Panel::default();
            let mut pool = ObjectPool::new(Rc::new(NullHost::new()));
            let warm: Vec<_> = (0..count)
                .filter_map(|_| pool.acquire(Some(&template)))
                .collect();
            for view in &warm {
                let _ = pool.release(view);
            }

            b.iter(|| {
                let borrowed: Vec<_> = (0..count)
                    .filter_map(|_| pool.acquire::<Panel>(None))
                    .collect();
                for view in &borrowed {
                    let _ = pool.release(black_box(view));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cold_acquire, bench_warm_round_trip);
criterion_main!(benches);
