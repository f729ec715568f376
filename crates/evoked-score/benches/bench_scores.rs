use std::{f64::consts::PI, hint::black_box};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use evoked_score::{Matrix, SimilarityService};

fn reference(rows: usize, cols: usize) -> Matrix {
    Matrix::from_fn(rows, cols, |r, c| {
        let phase = 2.0 * PI * 12.0 * (c / 2 + 1) as f64 * r as f64 / 250.0;
        if c % 2 == 0 {
            phase.sin()
        } else {
            phase.cos()
        }
    })
}

fn bench_canonical_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical_correlation");
    let mut rng = StdRng::seed_from_u64(1);

    for rows in [250, 500, 1000].iter() {
        let service = SimilarityService::new();
        let signal = Matrix::from_fn(*rows, 8, |_, _| rng.random::<f64>() - 0.5);
        let reference = service.insert(reference(*rows, 6)).unwrap();
        service.precompute_qr(reference).unwrap();

        group.bench_with_input(BenchmarkId::new("cached", rows), &signal, |b, s| {
            b.iter(|| {
                black_box(
                    service
                        .canonical_correlation(&s.into(), &reference.into())
                        .unwrap(),
                )
            });
        });

        let inline_reference = self::reference(*rows, 6);
        group.bench_with_input(BenchmarkId::new("inline", rows), &signal, |b, s| {
            b.iter(|| {
                black_box(
                    service
                        .canonical_correlation(&s.into(), &(&inline_reference).into())
                        .unwrap(),
                )
            });
        });
    }
}

fn bench_minimum_energy_combination(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimum_energy_combination");
    let mut rng = StdRng::seed_from_u64(2);

    for rows in [250, 500, 1000].iter() {
        let service = SimilarityService::new();
        let signal = Matrix::from_fn(*rows, 8, |_, _| rng.random::<f64>() - 0.5);
        let reference = reference(*rows, 6);

        group.bench_with_input(BenchmarkId::new("inline", rows), &signal, |b, s| {
            b.iter(|| {
                black_box(
                    service
                        .minimum_energy_combination(&s.into(), &(&reference).into())
                        .unwrap(),
                )
            });
        });
    }
}

criterion_group!(
    benches,
    bench_canonical_correlation,
    bench_minimum_energy_combination
);
criterion_main!(benches);
