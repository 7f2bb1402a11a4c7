//! Chain-ordering benchmark: DP table construction plus synopsis estimation.

use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use mnc_chain::optimize_chain;
use mnc_core::Sketch;
use mnc_estim::ChainNode;

/// Dimensions of an n-leaf chain, every inner dimension shared.
const DIMS: &[u64] = &[800, 200, 640, 320, 480, 160, 560, 240, 400, 880, 280, 720, 360];

fn chain_leaves(n: usize) -> Vec<Rc<ChainNode>> {
    assert!(n + 1 <= DIMS.len());
    (0..n)
        .map(|i| {
            let (rows, cols) = (DIMS[i], DIMS[i + 1]);
            // All dims are multiples of 8, so an eighth-dense fill keeps the
            // row and column totals in agreement.
            ChainNode::leaf(Sketch::from_counts(
                vec![cols / 8; rows as usize],
                vec![rows / 8; cols as usize],
            ))
        })
        .collect()
}

fn bench_optimize_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize_chain");
    for n in [4usize, 8, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            // Synopses memoize inside the nodes, so rebuild leaves per run.
            b.iter_batched(
                || chain_leaves(n),
                |leaves| optimize_chain(&leaves).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_optimize_chain);
criterion_main!(benches);
