//! Dimension-only inference, the silent fallback when sketches are missing.
//!
//! Mirrors the host compiler's plain shape rules for the closed operator
//! set. Never produces a nonzero count.

use mnc_core::dims::Dims;
use mnc_core::graph::{AggDirection, BinaryKind, NodeId, OpGraph, OpKind, ReorgKind};

pub fn infer_dims(graph: &OpGraph, id: NodeId) -> Option<Dims> {
    let node = graph.node(id);
    let input = |i: usize| node.inputs().get(i).map(|&c| graph.node(c));

    let dims = match node.kind {
        OpKind::MatMul => {
            let (a, b) = (input(0)?.dims, input(1)?.dims);
            known(a, b, Dims::new(a.rows, b.cols))?
        }
        OpKind::Binary(b) => {
            let kind = b;
            let (l, r) = (input(0)?, input(1)?);
            match kind {
                BinaryKind::CBind => {
                    known(l.dims, r.dims, Dims::new(l.dims.rows, l.dims.cols + r.dims.cols))?
                }
                BinaryKind::RBind => {
                    known(l.dims, r.dims, Dims::new(l.dims.rows + r.dims.rows, l.dims.cols))?
                }
                // Elementwise: the matrix operand's shape wins over a
                // scalar/vector modifier.
                _ => {
                    let m = if l.is_matrix() && !l.is_vector() { l } else { r };
                    m.dims.shape_known().then(|| Dims::new(m.dims.rows, m.dims.cols))?
                }
            }
        }
        OpKind::AggUnary(dir) => {
            let d = input(0)?.dims;
            match dir {
                AggDirection::RowCol => Dims::new(1, 1),
                AggDirection::Col => d.shape_known().then(|| Dims::new(1, d.cols))?,
                AggDirection::Row => d.shape_known().then(|| Dims::new(d.rows, 1))?,
            }
        }
        OpKind::Reorg(r) => {
            let d = input(0)?.dims;
            if !d.shape_known() {
                return None;
            }
            match r {
                ReorgKind::Trans => Dims::new(d.cols, d.rows),
                ReorgKind::Diag => {
                    if d.cols == 1 {
                        Dims::new(d.rows, d.rows)
                    } else {
                        Dims::new(d.rows, 1)
                    }
                }
            }
        }
        OpKind::Nary(_) => {
            // Shape folds pairwise the same way the sketch path does; keep
            // it simple and take the first operand's shape for Plus,
            // accumulating for binds.
            let mut d = input(0)?.dims;
            if !d.shape_known() {
                return None;
            }
            for i in 1..node.inputs().len() {
                let next = input(i)?.dims;
                if !next.shape_known() {
                    return None;
                }
                d = match node.kind {
                    OpKind::Nary(mnc_core::graph::NaryKind::CBind) => {
                        Dims::new(d.rows, d.cols + next.cols)
                    }
                    OpKind::Nary(mnc_core::graph::NaryKind::RBind) => {
                        Dims::new(d.rows + next.rows, d.cols)
                    }
                    _ => d,
                };
            }
            d
        }
        OpKind::TransientRead | OpKind::TransientWrite => {
            let d = input(0)?.dims;
            d.shape_known().then_some(d)?
        }
        OpKind::Literal | OpKind::PersistentRead => return None,
    };
    dims.shape_known().then_some(dims)
}

fn known(a: Dims, b: Dims, out: Dims) -> Option<Dims> {
    (a.shape_known() && b.shape_known()).then_some(out)
}
