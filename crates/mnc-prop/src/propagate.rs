//! Sketch propagation across arbitrary operator graphs.
//!
//! Applied post-order (children before parents), each node either derives an
//! output sketch from its operands' cache entries via the estimator, takes a
//! documented shortcut (scalar-mixed binaries, aggregates), or falls back to
//! dimension-only inference. Already-processed nodes (dims known and entry
//! cached) are skipped, so the pass is idempotent. Derived dims flow along
//! alias chains after every node.

use tracing::debug;

use mnc_core::dims::Dims;
use mnc_core::graph::{AggDirection, NodeId, OpGraph, OpKind};
use mnc_core::sketch::Sketch;

use mnc_cache::SketchCache;
use mnc_estim::estimator::estimate;
use mnc_estim::opcode::classify;
use mnc_estim::policy::ScalarMixPolicy;

/// Which nodes a propagation pass touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Every node.
    Full,
    /// Skip multiply nodes that have a multiply operand: chain interiors are
    /// left for the chain optimizer to estimate under its chosen split,
    /// while single multiplies (the chains' own leaves) still get seeded.
    SkipChainInteriors,
}

pub struct Propagator<'a> {
    cache: &'a SketchCache,
    policy: &'a dyn ScalarMixPolicy,
    traversal: Traversal,
}

impl<'a> Propagator<'a> {
    pub fn new(
        cache: &'a SketchCache,
        policy: &'a dyn ScalarMixPolicy,
        traversal: Traversal,
    ) -> Self {
        Self {
            cache,
            policy,
            traversal,
        }
    }

    /// Propagate sketches bottom-up through every DAG in `roots`.
    pub fn run(&self, graph: &mut OpGraph, roots: &[NodeId]) {
        for &root in roots {
            for id in graph.post_order(root) {
                if self.skip_for_traversal(graph, id) {
                    continue;
                }
                self.execute(graph, id);
            }
        }
    }

    fn skip_for_traversal(&self, graph: &OpGraph, id: NodeId) -> bool {
        self.traversal == Traversal::SkipChainInteriors
            && graph.node(id).kind == OpKind::MatMul
            && graph
                .node(id)
                .inputs()
                .iter()
                .any(|&c| graph.node(c).kind == OpKind::MatMul)
    }

    /// Process one node. Public so hosts can drive their own traversals.
    pub fn execute(&self, graph: &mut OpGraph, id: NodeId) {
        let node = graph.node(id);
        if node.kind == OpKind::Literal {
            return;
        }
        let processed = node.dims.fully_known() && self.cache.contains(&node.name);
        if node.is_matrix() && !processed {
            if let Some((dims, sketch)) = self.derive(graph, id) {
                let name = graph.node(id).name.clone();
                graph.node_mut(id).dims = dims;
                if let Some(s) = sketch {
                    self.cache.put_owned(name, s);
                }
            } else if let Some(dims) = super::infer::infer_dims(graph, id) {
                debug!(node = %id, "no sketch model; dimension-only inference");
                graph.node_mut(id).dims = dims;
            }
        }
        graph.propagate_dims_to_aliases(id);
    }

    fn derive(&self, graph: &OpGraph, id: NodeId) -> Option<(Dims, Option<Sketch>)> {
        match graph.node(id).kind {
            OpKind::Binary(_) => self
                .derive_mixed(graph, id)
                .or_else(|| self.derive_estimated(graph, id)),
            OpKind::AggUnary(dir) => self.derive_aggregate(graph, id, dir),
            OpKind::MatMul | OpKind::Reorg(_) | OpKind::Nary(_) => {
                self.derive_estimated(graph, id)
            }
            _ => None,
        }
    }

    /// Elementwise binary of a matrix with a scalar/vector operand: the
    /// policy decides the sketch (default: the matrix side's, unchanged).
    fn derive_mixed(&self, graph: &OpGraph, id: NodeId) -> Option<(Dims, Option<Sketch>)> {
        let node = graph.node(id);
        let [a, b] = node.inputs() else {
            return None;
        };
        let (a, b) = (graph.node(*a), graph.node(*b));
        let matrix = if (a.is_scalar() || a.is_vector()) && b.is_matrix() && b.dims.fully_known()
        {
            b
        } else if a.is_matrix() && (b.is_scalar() || b.is_vector()) && a.dims.fully_known() {
            a
        } else {
            return None;
        };
        let sketch = self
            .cache
            .get(&matrix.name)
            .and_then(|s| self.policy.mix(&s));
        Some((matrix.dims, sketch))
    }

    fn derive_aggregate(
        &self,
        graph: &OpGraph,
        id: NodeId,
        dir: AggDirection,
    ) -> Option<(Dims, Option<Sketch>)> {
        if dir == AggDirection::RowCol {
            // Full reduction: a 1x1 result with exactly one nonzero.
            let sketch = Sketch::from_counts(vec![1], vec![1]);
            return Some((sketch.dims(), Some(sketch)));
        }
        let input = graph.node(*graph.node(id).inputs().first()?);
        let ext = self.cache.get(&input.name)?;
        match dir {
            AggDirection::Col => {
                // Row vector: one entry per input column, nonzero where the
                // column had any nonzero.
                let cols: Vec<u64> = ext.col_counts().iter().map(|&c| u64::from(c > 0)).collect();
                let total: u64 = cols.iter().sum();
                let sketch = Sketch::from_estimate(vec![total], cols, total);
                Some((sketch.dims(), Some(sketch)))
            }
            AggDirection::Row => {
                let rows: Vec<u64> = ext.row_counts().iter().map(|&r| u64::from(r > 0)).collect();
                let total: u64 = rows.iter().sum();
                let sketch = Sketch::from_estimate(rows, vec![total], total);
                Some((sketch.dims(), Some(sketch)))
            }
            AggDirection::RowCol => unreachable!("handled above"),
        }
    }

    /// Recognized operators with every operand sketch present: call the
    /// estimator (n-ary folds left to right).
    fn derive_estimated(&self, graph: &OpGraph, id: NodeId) -> Option<(Dims, Option<Sketch>)> {
        let node = graph.node(id);
        let op = classify(node.kind)?;
        let operands = self.operand_sketches(graph, id)?;
        let result = match (op.is_unary(), operands.as_slice()) {
            (true, [only]) => estimate(only, None, op),
            (false, [first, rest @ ..]) if !rest.is_empty() => {
                let mut acc = estimate(first, Some(&rest[0]), op);
                for s in &rest[1..] {
                    acc = match acc {
                        Ok(est) => estimate(&est.sketch, Some(s), op),
                        err => err,
                    };
                }
                acc
            }
            _ => return None,
        };
        match result {
            Ok(est) => Some((est.sketch.dims(), Some(est.sketch))),
            Err(e) => {
                debug!(node = %id, error = %e, "estimation failed; falling back");
                None
            }
        }
    }

    fn operand_sketches(&self, graph: &OpGraph, id: NodeId) -> Option<Vec<std::sync::Arc<Sketch>>> {
        graph
            .node(id)
            .inputs()
            .iter()
            .map(|&c| {
                let ch = graph.node(c);
                if ch.is_matrix() && ch.dims.fully_known() {
                    self.cache.get(&ch.name)
                } else {
                    None
                }
            })
            .collect()
    }
}
