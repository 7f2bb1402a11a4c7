//! Whole-graph multiply-chain rewrite pass.
//!
//! Walks each root's DAG, finds maximal multiply chains, pulls the leaves'
//! sketches out of the cache, runs the DP search, and rewires the graph to
//! the winning association. Chains with missing sketches or unknown dims are
//! skipped silently; the pass never aborts compilation.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use mnc_core::prelude::{NodeId, OpGraph, OptimizerConfig, Result};

use mnc_cache::SketchCache;
use mnc_estim::node::ChainNode;

use crate::collect::{collect_chain, is_chain_top};
use crate::dp::optimize_chain;
use crate::relink::relink_chain;

/// Reassociate every eligible multiply chain reachable from `roots`.
/// Returns the number of chains rewritten.
pub fn optimize_mm_chains(
    graph: &mut OpGraph,
    roots: &[NodeId],
    cache: &SketchCache,
    config: &OptimizerConfig,
) -> Result<usize> {
    config.validate()?;
    if !config.sparsity_chain_opt {
        return Ok(0);
    }
    let mut tops = Vec::new();
    let mut seen = HashSet::new();
    for &root in roots {
        // Post-order: inner shared chains are optimized (and their result
        // sketches cached) before the chains consuming them.
        for id in graph.post_order(root) {
            if is_chain_top(graph, id) && seen.insert(id) {
                tops.push(id);
            }
        }
    }

    let mut rewritten = 0;
    for top in tops {
        if optimize_one(graph, top, cache, config)? {
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

fn optimize_one(
    graph: &mut OpGraph,
    top: NodeId,
    cache: &SketchCache,
    config: &OptimizerConfig,
) -> Result<bool> {
    let chain = collect_chain(graph, top);
    if chain.leaves.len() < config.min_chain_length {
        return Ok(false);
    }

    let Some(leaves) = leaf_nodes(graph, &chain.leaves, cache) else {
        debug!(top = %top, "chain skipped: missing sketches or dims");
        return Ok(false);
    };

    let plan = optimize_chain(&leaves)?;
    relink_chain(graph, &chain, &plan, cache)?;
    debug!(
        top = %top,
        operands = chain.leaves.len(),
        cost = %plan.cost,
        "reassociated multiply chain"
    );
    Ok(true)
}

/// Leaf estimation nodes from cached sketches, or `None` when any operand
/// lacks a sketch, has unknown dims, or breaks inner-dimension agreement.
fn leaf_nodes(
    graph: &OpGraph,
    leaf_ids: &[NodeId],
    cache: &SketchCache,
) -> Option<Vec<Rc<ChainNode>>> {
    let mut leaves = Vec::with_capacity(leaf_ids.len());
    let mut prev_cols: Option<u64> = None;
    for &id in leaf_ids {
        let node = graph.node(id);
        if !node.dims.shape_known() {
            return None;
        }
        let sketch = cache.get(&node.name)?;
        if sketch.rows() != node.dims.rows || sketch.cols() != node.dims.cols {
            return None;
        }
        if let Some(cols) = prev_cols {
            if cols != sketch.rows() {
                return None;
            }
        }
        prev_cols = Some(sketch.cols());
        leaves.push(ChainNode::leaf((*sketch).clone()));
    }
    Some(leaves)
}
