//! Bench: insert and point-lookup throughput at a few block sizes.
//!
//! Each insert iteration builds a fresh index in a temp directory; the
//! directory setup is not timed. Lookups run against one index seeded
//! once per block size.
//!
//! Run:
//!   cargo bench --bench btree_bench

use blockindex::BPlusTree;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use tempfile::{tempdir, TempDir};

const KEYS: i32 = 2_000;
const BLOCK_SIZES: [usize; 3] = [38, 512, 4096];

/// Deterministic scatter over 1..=KEYS so inserts do not arrive sorted.
fn scattered(i: i32) -> i32 {
    (i.wrapping_mul(7919) % KEYS) + 1
}

fn fresh_tree(block_size: usize) -> (BPlusTree, TempDir) {
    let dir = tempdir().unwrap();
    let tree = BPlusTree::open(dir.path().join("bench.idx"), block_size).unwrap();
    (tree, dir)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.throughput(Throughput::Elements(KEYS as u64));
    group.sample_size(10);

    for &block_size in &BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("sequential", block_size),
            &block_size,
            |b, &bs| {
                b.iter_batched(
                    || fresh_tree(bs),
                    |(mut tree, _dir)| {
                        for k in 1..=KEYS {
                            tree.insert(k, k).unwrap();
                        }
                        black_box(tree.block_count())
                    },
                    BatchSize::PerIteration,
                )
            },
        );

        group.bench_with_input(
            BenchmarkId::new("scattered", block_size),
            &block_size,
            |b, &bs| {
                b.iter_batched(
                    || fresh_tree(bs),
                    |(mut tree, _dir)| {
                        for i in 0..KEYS {
                            let k = scattered(i);
                            tree.insert(k, k).unwrap();
                        }
                        black_box(tree.block_count())
                    },
                    BatchSize::PerIteration,
                )
            },
        );
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(KEYS as u64));

    for &block_size in &BLOCK_SIZES {
        let (mut tree, _dir) = fresh_tree(block_size);
        for k in 1..=KEYS {
            tree.insert(k, k * 2).unwrap();
        }

        group.bench_function(BenchmarkId::from_parameter(block_size), |b| {
            b.iter(|| {
                let mut hits = 0;
                for i in 0..KEYS {
                    if tree.lookup(black_box(scattered(i))).unwrap().is_some() {
                        hits += 1;
                    }
                }
                assert_eq!(hits, KEYS);
                hits
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup);
criterion_main!(benches);
