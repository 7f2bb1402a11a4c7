//! Graph rewiring for the chosen chain association.
//!
//! Operator nodes in the pool are repurposed, not recreated: each one is
//! reassigned the operands of one sub-range of the optimal tree and stamped
//! with that sub-range's estimated dims. Pool index 0 is reserved for the
//! chain's top-level result node; the rest are consumed in the order the
//! rewrite descends.

use std::rc::Rc;

use tracing::trace;

use mnc_core::error::{Error, Result};
use mnc_core::graph::{NodeId, OpGraph};

use mnc_cache::SketchCache;
use mnc_estim::node::ChainNode;

use crate::collect::Chain;
use crate::dp::ChainPlan;

/// Rewire the chain's operators to the association recorded in `plan`.
/// Afterwards the tree has exactly n leaves and n-1 operators consistent
/// with the split table; the top node's sketch lands in the cache and its
/// dims propagate to directly-aliased consumers.
pub fn relink_chain(
    graph: &mut OpGraph,
    chain: &Chain,
    plan: &ChainPlan,
    cache: &SketchCache,
) -> Result<()> {
    if chain.operators.is_empty() || chain.leaves.len() != chain.operators.len() + 1 {
        return Err(Error::Invariant(format!(
            "malformed chain: {} leaves, {} operators",
            chain.leaves.len(),
            chain.operators.len()
        )));
    }

    // Detach every chain operator from its current operands; consumers of
    // the top node (outside the chain) stay linked.
    for &op in &chain.operators {
        graph.unlink_inputs(op);
    }

    let top = chain.operators[0];
    let mut next_op = 1usize;
    relink(
        graph,
        top,
        0,
        chain.leaves.len() - 1,
        chain,
        plan,
        &mut next_op,
        &plan.root,
    )?;

    let sketch = plan.root.synopsis()?;
    graph.node_mut(top).dims = sketch.dims();
    cache.put_owned(graph.node(top).name.clone(), sketch.clone());
    graph.propagate_dims_to_aliases(top);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn relink(
    graph: &mut OpGraph,
    h: NodeId,
    i: usize,
    j: usize,
    chain: &Chain,
    plan: &ChainPlan,
    next_op: &mut usize,
    node: &Rc<ChainNode>,
) -> Result<()> {
    // Single operand: nothing to rewire below a leaf.
    if i == j {
        return Ok(());
    }
    let k = plan
        .split_at(i, j)
        .ok_or_else(|| Error::Invariant(format!("missing split for range [{i},{j}]")))?;
    trace!(node = %h, i, j, split = k, "relinking chain range");

    graph.node_mut(h).dims = node.dims()?;

    let left = if k == i {
        chain.leaves[i]
    } else {
        take_operator(chain, next_op)?
    };
    graph.link(h, left);

    let right = if k + 1 == j {
        chain.leaves[j]
    } else {
        take_operator(chain, next_op)?
    };
    graph.link(h, right);

    let lnode = node
        .left()
        .ok_or_else(|| Error::Invariant("chain plan node missing left child".into()))?;
    let rnode = node
        .right()
        .ok_or_else(|| Error::Invariant("chain plan node missing right child".into()))?;
    relink(graph, left, i, k, chain, plan, next_op, lnode)?;
    relink(graph, right, k + 1, j, chain, plan, next_op, rnode)?;
    Ok(())
}

fn take_operator(chain: &Chain, next_op: &mut usize) -> Result<NodeId> {
    let id = chain
        .operators
        .get(*next_op)
        .copied()
        .ok_or_else(|| Error::Invariant("operator pool exhausted".into()))?;
    *next_op += 1;
    Ok(id)
}
