//! Core analysis performance benchmarks.
//!
//! Measures dependency detection, closure computation and full
//! decomposition over synthetic denormalized data.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use prism::{
    closure, decompose_bcnf, infer_keys, minimal_cover, synthesize_3nf, AttributeSet, Dataset,
    FdDetector, FunctionalDependency,
};

/// Generate a denormalized orders table: order → customer → region.
fn generate_orders(rows: usize) -> Dataset {
    let headers = vec![
        "order_id".to_string(),
        "customer_id".to_string(),
        "customer_name".to_string(),
        "region".to_string(),
        "region_manager".to_string(),
        "amount".to_string(),
    ];

    let rows: Vec<Vec<String>> = (0..rows)
        .map(|i| {
            let customer = i % 97;
            let region = customer % 11;
            vec![
                format!("o{:06}", i),
                format!("c{:04}", customer),
                format!("Customer {}", customer),
                format!("region_{}", region),
                format!("Manager {}", region),
                format!("{}", (i * 7) % 1000),
            ]
        })
        .collect();

    Dataset::new(headers, rows)
}

/// A chain a0 → a1 → ... → an of single-attribute dependencies.
fn chain_fds(len: usize) -> (AttributeSet, Vec<FunctionalDependency>) {
    let fds: Vec<FunctionalDependency> = (0..len)
        .map(|i| {
            FunctionalDependency::new(
                AttributeSet::single(format!("a{}", i)),
                AttributeSet::single(format!("a{}", i + 1)),
            )
        })
        .collect();
    let all: AttributeSet = (0..=len).map(|i| format!("a{}", i)).collect();
    (all, fds)
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("fd_detection");

    for rows in [100, 1_000, 10_000].iter() {
        let dataset = generate_orders(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("orders_rows", rows), &dataset, |b, ds| {
            b.iter(|| {
                let report = FdDetector::new().detect(black_box(ds));
                black_box(report.dependencies.len())
            });
        });
    }

    group.finish();
}

fn bench_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("closure");

    for len in [10, 50, 200].iter() {
        let (_, fds) = chain_fds(*len);
        let start = AttributeSet::single("a0");
        group.bench_with_input(BenchmarkId::new("chain_length", len), &fds, |b, fds| {
            b.iter(|| black_box(closure(black_box(&start), fds)).len());
        });
    }

    group.finish();
}

fn bench_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("decomposition");

    let (all, fds) = chain_fds(12);
    let cover = minimal_cover(&fds).unwrap();
    let keys = infer_keys(&all, &cover);

    group.bench_function("synthesize_3nf_chain_12", |b| {
        b.iter(|| black_box(synthesize_3nf(&cover, &keys, &all).unwrap()).relations.len());
    });

    group.bench_function("decompose_bcnf_chain_12", |b| {
        b.iter(|| black_box(decompose_bcnf(&all, &cover).unwrap()).relations.len());
    });

    group.bench_function("minimal_cover_chain_12", |b| {
        b.iter(|| black_box(minimal_cover(&fds).unwrap()).len());
    });

    group.finish();
}

criterion_group!(benches, bench_detection, bench_closure, bench_decomposition);
criterion_main!(benches);
