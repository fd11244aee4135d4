//! Benchmarks for riskpeers-math operations.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use riskpeers_math::{KMeans, population_covariance, select_elbow};

/// Risk-feature-like rows drawn around a handful of centers.
fn random_features(rows: usize, n_centers: usize) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 0.05).unwrap();
    let centers: Vec<[f64; 3]> = (0..n_centers)
        .map(|_| [rng.gen_range(-0.3..0.6), rng.gen_range(0.1..0.8), rng.gen_range(0.3..2.0)])
        .collect();
    Array2::from_shape_fn((rows, 3), |(i, j)| centers[i % n_centers][j] + noise.sample(&mut rng))
}

fn random_returns(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.r#gen::<f64>() * 0.1 - 0.05).collect()
}

fn bench_kmeans_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans_fit");

    // sector sizes seen in broad equity indices
    for rows in [25, 75, 150, 500] {
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            let data = random_features(rows, 4);
            let kmeans = KMeans::new(4, 42);
            b.iter(|| kmeans.fit(black_box(&data)).unwrap());
        });
    }

    group.finish();
}

fn bench_elbow_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("elbow_sweep");
    group.sample_size(30);

    for rows in [75, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            let data = random_features(rows, 3);
            let ks: Vec<usize> = (1..=10).collect();
            b.iter(|| {
                let inertias: Vec<f64> =
                    ks.iter().map(|&k| KMeans::new(k, 42).fit(&data).unwrap().inertia).collect();
                select_elbow(black_box(&ks), black_box(&inertias)).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_covariance(c: &mut Criterion) {
    let mut group = c.benchmark_group("population_covariance");

    for size in [252, 1260, 2520] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let x = random_returns(size);
            let y = random_returns(size);
            b.iter(|| population_covariance(black_box(&x), black_box(&y)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kmeans_fit, bench_elbow_sweep, bench_covariance);
criterion_main!(benches);
