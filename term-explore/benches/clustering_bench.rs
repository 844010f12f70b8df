use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use term_explore::analyzers::clustering::ward_linkage;
use term_explore::analyzers::{Dbscan, DimensionalityReducer, FeatureMatrix};

/// Deterministic pseudo-random points grouped around a few centers.
fn blobs(rows: usize, width: usize) -> FeatureMatrix {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let data = (0..rows)
        .map(|row| {
            let center = (row % 4) as f64 * 3.0;
            (0..width).map(|_| center + next() - 0.5).collect()
        })
        .collect();
    let columns = (0..width).map(|i| format!("f{i}")).collect();
    FeatureMatrix::from_rows(columns, data).unwrap().standardized()
}

fn benchmark_dbscan(c: &mut Criterion) {
    let mut group = c.benchmark_group("dbscan_fit");

    for rows in [100, 500, 2000].iter() {
        let features = blobs(*rows, 4);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &features, |b, features| {
            b.iter(|| Dbscan::default().fit(std::hint::black_box(features)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_ward(c: &mut Criterion) {
    let mut group = c.benchmark_group("ward_linkage");
    group.sample_size(20);

    for rows in [100, 500, 1000].iter() {
        let features = blobs(*rows, 4);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &features, |b, features| {
            b.iter(|| ward_linkage(std::hint::black_box(features)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_pca(c: &mut Criterion) {
    let mut group = c.benchmark_group("pca_project");

    for width in [2, 8, 32].iter() {
        let features = blobs(2000, *width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &features, |b, features| {
            b.iter(|| {
                DimensionalityReducer::new()
                    .project(std::hint::black_box(features))
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_dbscan, benchmark_ward, benchmark_pca);
criterion_main!(benches);
