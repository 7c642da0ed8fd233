use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use blotto::{
    dataset::OpponentTable,
    individual::Individual,
    rng::RandomNumberGenerator,
    scoring::evaluate,
    Allocation,
};
use rayon::prelude::*;

// A field of 78 random opponents, the size of the recorded one
fn opponent_field(rng: &mut RandomNumberGenerator) -> OpponentTable {
    let empty = OpponentTable::from_rows(vec![vec![0u32; blotto::FRONTS]]).unwrap();
    let rows: Vec<Vec<u32>> = (0..78)
        .map(|_| Individual::random(&empty, rng).allocation().as_slice().to_vec())
        .collect();
    OpponentTable::from_rows(rows).unwrap()
}

fn score_sequential(candidates: &[Allocation], table: &OpponentTable) -> Vec<f64> {
    candidates
        .iter()
        .map(|candidate| evaluate(candidate.as_slice(), table))
        .collect()
}

fn score_parallel(candidates: &[Allocation], table: &OpponentTable) -> Vec<f64> {
    candidates
        .par_iter()
        .map(|candidate| evaluate(candidate.as_slice(), table))
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut rng = RandomNumberGenerator::from_seed(1);
    let table = opponent_field(&mut rng);
    let candidate = *Individual::random(&table, &mut rng).allocation();

    c.bench_function("evaluate_single", |b| {
        b.iter(|| evaluate(black_box(candidate.as_slice()), black_box(&table)))
    });
}

fn bench_candidate_pools(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_pools");
    let mut rng = RandomNumberGenerator::from_seed(2);
    let table = opponent_field(&mut rng);

    for size in [100, 1500, 10000].iter() {
        let candidates: Vec<Allocation> = (0..*size)
            .map(|_| *Individual::random(&table, &mut rng).allocation())
            .collect();

        group.bench_with_input(BenchmarkId::new("sequential", size), &candidates, |b, candidates| {
            b.iter(|| score_sequential(black_box(candidates), black_box(&table)))
        });

        group.bench_with_input(BenchmarkId::new("parallel", size), &candidates, |b, candidates| {
            b.iter(|| score_parallel(black_box(candidates), black_box(&table)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_candidate_pools);
criterion_main!(benches);
