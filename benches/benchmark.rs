use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use ordered_avl::OrderedTree;

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("tree_insert", |b| {
        let mut tree = OrderedTree::new();
        b.iter(|| {
            for value in &values {
                tree.insert(*value, *value);
            }
        })
    });

    let mut tree = OrderedTree::new();
    for value in &values {
        tree.insert(*value, *value);
    }

    c.bench_function("tree_find", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.find(value));
            }
        })
    });

    c.bench_function("tree_update", |b| {
        let mut tree = tree.clone();
        b.iter(|| {
            for value in &values {
                if let Some(node) = tree.find(value) {
                    black_box(tree.update(node, *value, value.wrapping_add(1)));
                }
            }
        })
    });

    c.bench_function("tree_remove", |b| {
        let mut tree = tree.clone();
        b.iter(|| {
            for value in &values {
                if let Some(node) = tree.find(value) {
                    tree.remove(node);
                }
            }
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
