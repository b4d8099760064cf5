//! Nearest-neighbour search benchmarks.
//!
//! Compares the exhaustive scan against the graph walk on synthetic dense
//! spaces of growing vocabulary size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use wordspace::dense::DenseSpaceBuilder;
use wordspace::search;
use wordspace::{Config, Measure, QueryVector, WordSpace};

const DIMS: usize = 16;
const NEIGHBOUR_WIDTH: usize = 10;

/// Deterministic pseudo-random unit-ish vector per word id.
fn synthetic_row(id: usize) -> Vec<f32> {
    (0..DIMS)
        .map(|d| {
            let x = (id * 31 + d * 17) % 97;
            (x as f32 / 97.0) - 0.5
        })
        .collect()
}

fn synthetic_space(words: usize) -> WordSpace {
    let mut config = Config::default();
    config.dont_compute_2nd_order = false;
    config.number_of_similar_words = NEIGHBOUR_WIDTH as u32;

    let mut builder = DenseSpaceBuilder::new(config);
    for i in 0..words {
        builder.add_word(&format!("w{:06}", i), i as u64 + 1, synthetic_row(i));
    }
    for i in 0..words {
        let neighbours = (1..=NEIGHBOUR_WIDTH)
            .map(|step| {
                (
                    ((i + step * 7) % words) as u32,
                    1.0 - step as f32 / (NEIGHBOUR_WIDTH + 1) as f32,
                )
            })
            .collect();
        builder.set_neighbours(i, neighbours);
    }
    WordSpace::Dense(builder.build().unwrap())
}

fn bench_exhaustive(c: &mut Criterion) {
    let mut group = c.benchmark_group("exhaustive_scan");
    for words in [1_000, 10_000].iter() {
        let space = synthetic_space(*words);
        let query = QueryVector::Dense(synthetic_row(words / 2));
        group.bench_with_input(BenchmarkId::from_parameter(words), words, |b, _| {
            b.iter(|| {
                let results =
                    search::nearest_neighbours(&space, &query, Measure::Cosine, 20).unwrap();
                black_box(results);
            })
        });
    }
    group.finish();
}

fn bench_graph_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_walk");
    for words in [1_000, 10_000].iter() {
        let space = synthetic_space(*words);
        let query = QueryVector::Dense(synthetic_row(words / 2));
        group.bench_with_input(BenchmarkId::from_parameter(words), words, |b, _| {
            b.iter(|| {
                let results =
                    search::graph_search_seeded(&space, &query, Measure::Cosine, 20, 42).unwrap();
                black_box(results);
            })
        });
    }
    group.finish();
}

fn bench_pairwise_similarity(c: &mut Criterion) {
    let space = synthetic_space(10_000);
    c.bench_function("semantic_similarity", |b| {
        b.iter(|| {
            let sim = space
                .semantic_similarity("w000100", "w000200", Measure::Cosine)
                .unwrap();
            black_box(sim);
        })
    });
}

criterion_group!(
    benches,
    bench_exhaustive,
    bench_graph_walk,
    bench_pairwise_similarity
);
criterion_main!(benches);
