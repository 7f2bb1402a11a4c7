//! Sketch propagation tests over non-chain operator graphs.


use mnc_cache::SketchCache;
use mnc_core::{
    AggDirection, BinaryKind, DataKind, Dims, NaryKind, OpGraph, OpKind, ReorgKind, Sketch,
};
use mnc_estim::estimator::estimate;
use mnc_estim::{DeclineMixed, OpCode, PreserveMatrixSparsity};
use mnc_prop::{Propagator, Traversal};
use test_util::uniform_sketch;

fn propagate_full(graph: &mut OpGraph, roots: &[mnc_core::NodeId], cache: &SketchCache) {
    Propagator::new(cache, &PreserveMatrixSparsity, Traversal::Full).run(graph, roots);
}

#[test]
fn transpose_node_gets_swapped_sketch() {
    let mut g = OpGraph::new();
    let x = g.add_matrix("X", OpKind::TransientRead, Dims::with_nnz(3, 4, 5));
    let t = g.add("Xt", OpKind::Reorg(ReorgKind::Trans), DataKind::Matrix);
    g.link(t, x);

    let cache = SketchCache::new();
    cache.put_owned("X", Sketch::from_counts(vec![2, 0, 3], vec![1, 1, 2, 1]));
    propagate_full(&mut g, &[t], &cache);

    let out = cache.get("Xt").expect("transpose sketch cached");
    assert_eq!(out.row_counts(), &[1, 1, 2, 1]);
    assert_eq!(out.col_counts(), &[2, 0, 3]);
    assert_eq!(g.node(t).dims, Dims::with_nnz(4, 3, 5));
}

#[test]
fn cbind_row_counts_are_elementwise_sums() {
    let a = Sketch::from_counts(vec![1, 0, 2], vec![2, 1]);
    let b = Sketch::from_counts(vec![0, 2, 1], vec![1, 2]);
    let bound = estimate(&a, Some(&b), OpCode::CBind).unwrap().sketch;

    // Per-row totals of the bound matrix equal the sum of the operands'.
    let summed: Vec<u64> = a
        .row_counts()
        .iter()
        .zip(b.row_counts())
        .map(|(&x, &y)| x + y)
        .collect();
    assert_eq!(bound.row_counts(), summed.as_slice());

    // Reducing rows after binding matches reducing each side then adding.
    let total_after: u64 = bound.row_counts().iter().sum();
    let total_each: u64 =
        a.row_counts().iter().sum::<u64>() + b.row_counts().iter().sum::<u64>();
    assert_eq!(total_after, total_each);
}

#[test]
fn scalar_matrix_binary_preserves_matrix_sketch() {
    let mut g = OpGraph::new();
    let s = g.add("seven", OpKind::Literal, DataKind::Scalar);
    let lit = g.add("three", OpKind::Literal, DataKind::Scalar);
    let sc = g.add("k", OpKind::Binary(BinaryKind::Plus), DataKind::Scalar);
    g.link(sc, s);
    g.link(sc, lit);
    let x = g.add_matrix("X", OpKind::TransientRead, Dims::with_nnz(2, 3, 3));
    let y = g.add("Y", OpKind::Binary(BinaryKind::Mult), DataKind::Matrix);
    g.link(y, sc);
    g.link(y, x);

    let cache = SketchCache::new();
    let xs = Sketch::from_counts(vec![2, 1], vec![1, 1, 1]);
    cache.put_owned("X", xs.clone());
    propagate_full(&mut g, &[y], &cache);

    assert_eq!(*cache.get("Y").expect("mixed sketch cached"), xs);
    assert_eq!(g.node(y).dims, Dims::with_nnz(2, 3, 3));
}

#[test]
fn declining_policy_falls_back_to_dims_only() {
    let mut g = OpGraph::new();
    let s = g.add("seven", OpKind::Literal, DataKind::Scalar);
    let x = g.add_matrix("X", OpKind::TransientRead, Dims::with_nnz(2, 3, 3));
    let y = g.add("Y", OpKind::Binary(BinaryKind::Mult), DataKind::Matrix);
    g.link(y, s);
    g.link(y, x);

    let cache = SketchCache::new();
    cache.put_owned("X", Sketch::from_counts(vec![2, 1], vec![1, 1, 1]));
    Propagator::new(&cache, &DeclineMixed, Traversal::Full).run(&mut g, &[y]);

    assert!(cache.get("Y").is_none());
    // Dims still flow through the mixed-binary shortcut.
    assert_eq!(g.node(y).dims.rows, 2);
    assert_eq!(g.node(y).dims.cols, 3);
}

#[test]
fn full_reduction_yields_single_nonzero() {
    let mut g = OpGraph::new();
    let x = g.add_matrix("X", OpKind::TransientRead, Dims::with_nnz(5, 5, 10));
    let agg = g.add("sx", OpKind::AggUnary(AggDirection::RowCol), DataKind::Matrix);
    g.link(agg, x);

    let cache = SketchCache::new();
    cache.put_owned("X", uniform_sketch(5, 5, 2, 2));
    propagate_full(&mut g, &[agg], &cache);

    let out = cache.get("sx").expect("reduction sketch cached");
    assert_eq!(out.dims(), Dims::with_nnz(1, 1, 1));
    assert_eq!(g.node(agg).dims, Dims::with_nnz(1, 1, 1));
}

#[test]
fn column_reduction_counts_nonempty_columns() {
    let mut g = OpGraph::new();
    let x = g.add_matrix("X", OpKind::TransientRead, Dims::with_nnz(3, 4, 5));
    let agg = g.add("cx", OpKind::AggUnary(AggDirection::Col), DataKind::Matrix);
    g.link(agg, x);

    let cache = SketchCache::new();
    cache.put_owned("X", Sketch::from_counts(vec![2, 0, 3], vec![2, 0, 3, 0]));
    propagate_full(&mut g, &[agg], &cache);

    let out = cache.get("cx").expect("column reduction cached");
    assert_eq!(out.col_counts(), &[1, 0, 1, 0]);
    assert_eq!(out.row_counts(), &[2]);
    assert_eq!(g.node(agg).dims, Dims::with_nnz(1, 4, 2));
}

#[test]
fn row_reduction_counts_nonempty_rows() {
    let mut g = OpGraph::new();
    let x = g.add_matrix("X", OpKind::TransientRead, Dims::with_nnz(3, 4, 5));
    let agg = g.add("rx", OpKind::AggUnary(AggDirection::Row), DataKind::Matrix);
    g.link(agg, x);

    let cache = SketchCache::new();
    cache.put_owned("X", Sketch::from_counts(vec![2, 0, 3], vec![2, 0, 3, 0]));
    propagate_full(&mut g, &[agg], &cache);

    let out = cache.get("rx").expect("row reduction cached");
    assert_eq!(out.row_counts(), &[1, 0, 1]);
    assert_eq!(out.col_counts(), &[2]);
    assert_eq!(g.node(agg).dims, Dims::with_nnz(3, 1, 2));
}

#[test]
fn propagation_is_idempotent_per_node() {
    let mut g = OpGraph::new();
    let x = g.add_matrix("X", OpKind::TransientRead, Dims::with_nnz(3, 4, 5));
    let t = g.add("Xt", OpKind::Reorg(ReorgKind::Trans), DataKind::Matrix);
    g.link(t, x);

    let cache = SketchCache::new();
    cache.put_owned("X", Sketch::from_counts(vec![2, 0, 3], vec![1, 1, 2, 1]));
    propagate_full(&mut g, &[t], &cache);
    let first = cache.get("Xt").unwrap();

    // Replace the cached input; the second pass must not recompute the
    // already-processed transpose.
    cache.put_owned("X", Sketch::from_counts(vec![0, 0, 1], vec![0, 0, 1, 0]));
    propagate_full(&mut g, &[t], &cache);
    assert_eq!(cache.get("Xt").unwrap(), first);
}

#[test]
fn restricted_traversal_leaves_chain_interiors_alone() {
    let mut g = OpGraph::new();
    let a = g.add_matrix("A", OpKind::TransientRead, Dims::with_nnz(4, 4, 8));
    let b = g.add_matrix("B", OpKind::TransientRead, Dims::with_nnz(4, 4, 8));
    let c = g.add_matrix("C", OpKind::TransientRead, Dims::with_nnz(4, 4, 8));
    let t1 = g.add("t1", OpKind::MatMul, DataKind::Matrix);
    let t2 = g.add("t2", OpKind::MatMul, DataKind::Matrix);
    g.link(t1, a);
    g.link(t1, b);
    g.link(t2, t1);
    g.link(t2, c);

    let cache = SketchCache::new();
    for name in ["A", "B", "C"] {
        cache.put_owned(name, uniform_sketch(4, 4, 2, 2));
    }
    Propagator::new(&cache, &PreserveMatrixSparsity, Traversal::SkipChainInteriors)
        .run(&mut g, &[t2]);

    // The single multiply below the chain is seeded; the chain node whose
    // operand is itself a multiply is left for the chain optimizer.
    assert!(cache.contains("t1"));
    assert!(!cache.contains("t2"));
}

#[test]
fn nary_bind_folds_across_all_operands() {
    let mut g = OpGraph::new();
    let a = g.add_matrix("A", OpKind::TransientRead, Dims::with_nnz(2, 2, 2));
    let b = g.add_matrix("B", OpKind::TransientRead, Dims::with_nnz(2, 2, 2));
    let c = g.add_matrix("C", OpKind::TransientRead, Dims::with_nnz(2, 1, 1));
    let bound = g.add("bound", OpKind::Nary(NaryKind::CBind), DataKind::Matrix);
    g.link(bound, a);
    g.link(bound, b);
    g.link(bound, c);

    let cache = SketchCache::new();
    cache.put_owned("A", Sketch::from_counts(vec![1, 1], vec![1, 1]));
    cache.put_owned("B", Sketch::from_counts(vec![1, 1], vec![1, 1]));
    cache.put_owned("C", Sketch::from_counts(vec![0, 1], vec![1]));
    propagate_full(&mut g, &[bound], &cache);

    // Left-to-right fold over all three operands: column counts concatenate,
    // row counts add up.
    let out = cache.get("bound").expect("n-ary sketch cached");
    assert_eq!(out.row_counts(), &[2, 3]);
    assert_eq!(out.col_counts(), &[1, 1, 1, 1, 1]);
    assert_eq!(g.node(bound).dims, Dims::with_nnz(2, 5, 5));
}

#[test]
fn unmodeled_operator_falls_back_to_dimension_inference() {
    let mut g = OpGraph::new();
    let x = g.add_matrix("X", OpKind::TransientRead, Dims::with_nnz(3, 4, 5));
    let y = g.add_matrix("Y", OpKind::TransientRead, Dims::with_nnz(3, 4, 6));
    let other = g.add("Z", OpKind::Binary(BinaryKind::Other), DataKind::Matrix);
    g.link(other, x);
    g.link(other, y);

    let cache = SketchCache::new();
    cache.put_owned("X", Sketch::from_counts(vec![2, 0, 3], vec![2, 0, 3, 0]));
    cache.put_owned("Y", Sketch::from_counts(vec![2, 1, 3], vec![2, 1, 3, 0]));
    propagate_full(&mut g, &[other], &cache);

    assert!(cache.get("Z").is_none());
    assert_eq!(g.node(other).dims.rows, 3);
    assert_eq!(g.node(other).dims.cols, 4);
    assert_eq!(g.node(other).dims.nnz, None);
}
