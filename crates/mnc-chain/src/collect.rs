//! Maximal multiply-chain discovery in the operator graph.

use mnc_core::graph::{NodeId, OpGraph, OpKind};

/// One maximal chain: ordered leaf operands and the pool of multiply
/// operators that hold the chain's intermediate results. `operators[0]` is
/// the chain's top-level node.
#[derive(Debug)]
pub struct Chain {
    pub leaves: Vec<NodeId>,
    pub operators: Vec<NodeId>,
}

impl Chain {
    /// Number of multiplications in the chain.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

/// A multiply node absorbed into a larger chain rather than starting one:
/// its single consumer is itself a multiply.
fn is_chain_interior(graph: &OpGraph, id: NodeId) -> bool {
    let node = graph.node(id);
    node.kind == OpKind::MatMul
        && matches!(node.consumers(), [c] if graph.node(*c).kind == OpKind::MatMul)
}

/// True when `id` starts a maximal chain.
pub fn is_chain_top(graph: &OpGraph, id: NodeId) -> bool {
    graph.node(id).kind == OpKind::MatMul && !is_chain_interior(graph, id)
}

/// Collect the maximal chain rooted at `top`, descending only into multiply
/// inputs consumed by nothing else (shared products stay leaves so their
/// results remain materialized once).
pub fn collect_chain(graph: &OpGraph, top: NodeId) -> Chain {
    let mut chain = Chain {
        leaves: Vec::new(),
        operators: Vec::new(),
    };
    expand(graph, top, &mut chain);
    chain
}

fn expand(graph: &OpGraph, op: NodeId, chain: &mut Chain) {
    chain.operators.push(op);
    for &input in graph.node(op).inputs() {
        if is_chain_interior(graph, input) {
            expand(graph, input, chain);
        } else {
            chain.leaves.push(input);
        }
    }
}
