use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use depth_eval::metrics::evaluate;
use std::hint::black_box;

criterion_group! {
    name = metric_benchmarks;
    config = Criterion::default().sample_size(100);
    targets = evaluate_benchmark,
}
criterion_main!(metric_benchmarks);

fn evaluate_benchmark(c: &mut Criterion) {
    // Ground-truth resolution planes, mildly structured so no branch is
    // trivially predictable.
    let len = 320 * 420;
    let pred: Vec<f32> = (0..len).map(|i| 0.2 + (i % 97) as f32 / 97.0).collect();
    let gt: Vec<f32> = (0..len).map(|i| 0.3 + (i % 89) as f32 / 89.0).collect();

    let mut group = c.benchmark_group("depth_eval_metrics");
    group.throughput(Throughput::Elements(len as u64));
    group.bench_function("evaluate_320x420", |b| {
        b.iter(|| {
            let metrics = evaluate(&pred, &gt, 10.0).unwrap();
            black_box(metrics);
        });
    });
    group.finish();
}
