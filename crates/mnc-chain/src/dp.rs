//! Dynamic-programming search over multiply-chain associations.
//!
//! Classic matrix-chain ordering (Cormen et al., Introduction to Algorithms,
//! 3rd ed., p. 395), with the scalar-multiplication count replaced by the
//! sketch dot-product cost metric. O(n^3) estimator calls; each candidate
//! pairing builds a `ChainNode` whose write-once synopsis caps estimation at
//! one pass per distinct sub-chain.

use std::rc::Rc;

use tracing::trace;

use mnc_core::error::{Error, Result};

use mnc_estim::estimator::matmul_cost;
use mnc_estim::node::ChainNode;
use mnc_estim::opcode::OpCode;

/// Result of the DP search: the split table, the root estimation node (its
/// subtree carries a synopsis for every chosen sub-range), and the total
/// estimated cost.
#[derive(Debug)]
pub struct ChainPlan {
    pub split: Vec<Vec<Option<usize>>>,
    pub root: Rc<ChainNode>,
    pub cost: u128,
}

impl ChainPlan {
    pub fn split_at(&self, i: usize, j: usize) -> Option<usize> {
        self.split[i][j]
    }
}

/// Find the cost-minimal association for `leaves[0] * ... * leaves[n-1]`.
/// Operand order is fixed (multiplication is associative, not commutative);
/// only the grouping varies. Ties pick the smallest split index. Chains of
/// length 1 short-circuit without estimation.
pub fn optimize_chain(leaves: &[Rc<ChainNode>]) -> Result<ChainPlan> {
    let n = leaves.len();
    if n == 0 {
        return Err(Error::Invariant("empty multiply chain".into()));
    }
    if n == 1 {
        return Ok(ChainPlan {
            split: vec![vec![None]],
            root: leaves[0].clone(),
            cost: 0,
        });
    }

    let mut cost = vec![vec![0u128; n]; n];
    let mut split: Vec<Vec<Option<usize>>> = vec![vec![None; n]; n];
    let mut nodes: Vec<Vec<Option<Rc<ChainNode>>>> = vec![vec![None; n]; n];
    for (i, leaf) in leaves.iter().enumerate() {
        nodes[i][i] = Some(leaf.clone());
    }

    for l in 2..=n {
        for i in 0..=(n - l) {
            let j = i + l - 1;
            let mut best: Option<(u128, usize, Rc<ChainNode>)> = None;
            for k in i..j {
                let left = sub_chain(&nodes, i, k)?;
                let right = sub_chain(&nodes, k + 1, j)?;
                let pair = ChainNode::pair(left.clone(), right.clone(), OpCode::MatMul);
                // Derive the candidate's synopsis now; winners become
                // children at larger chain lengths.
                pair.synopsis()?;
                let mm = matmul_cost(left.synopsis()?, right.synopsis()?);
                let c = cost[i][k]
                    .saturating_add(cost[k + 1][j])
                    .saturating_add(mm);
                if best.as_ref().map_or(true, |(bc, _, _)| c < *bc) {
                    best = Some((c, k, pair));
                }
            }
            let (c, k, node) =
                best.ok_or_else(|| Error::Invariant(format!("no split for range [{i},{j}]")))?;
            trace!(i, j, cost = %c, split = k, "chain dp cell");
            cost[i][j] = c;
            split[i][j] = Some(k);
            nodes[i][j] = Some(node);
        }
    }

    let root = sub_chain(&nodes, 0, n - 1)?;
    Ok(ChainPlan {
        split,
        root,
        cost: cost[0][n - 1],
    })
}

fn sub_chain(
    nodes: &[Vec<Option<Rc<ChainNode>>>],
    i: usize,
    j: usize,
) -> Result<Rc<ChainNode>> {
    nodes[i][j]
        .clone()
        .ok_or_else(|| Error::Invariant(format!("dp cell [{i},{j}] not yet computed")))
}
