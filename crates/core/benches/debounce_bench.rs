//! Debouncer throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use settle_core::Debouncer;
use std::time::Duration;

fn bench_update(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let debouncer = Debouncer::with_handle(0u64, Duration::from_millis(500), runtime.handle().clone());

    c.bench_function("update_burst_1000", |b| {
        b.iter(|| {
            runtime.block_on(async {
                for i in 0..1000u64 {
                    debouncer.update(black_box(i));
                }
                // Let aborted timers be reaped
                tokio::task::yield_now().await;
            })
        });
    });

    c.bench_function("update_then_flush", |b| {
        b.iter(|| {
            runtime.block_on(async {
                debouncer.update(black_box(1));
                black_box(debouncer.flush())
            })
        });
    });
}

criterion_group!(benches, bench_update);
criterion_main!(benches);
