//! Arena-based operator graph.
//!
//! The surrounding compiler owns the real program representation; this arena
//! mirrors the narrow contract the optimizer needs: per-node name, kind tag,
//! dims/nnz, and mutual operand/consumer links. Nodes are addressed by stable
//! `NodeId` indices so both directions traverse in O(1) without ownership
//! cycles.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dims::Dims;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(v: u32) -> Self {
        Self(v)
    }
    pub const fn get(self) -> u32 {
        self.0
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Binary elementwise / append operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryKind {
    Mult,
    Div,
    Plus,
    Minus,
    CBind,
    RBind,
    Other,
}

/// Aggregation direction of a unary aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggDirection {
    /// Full reduction to a 1x1 result.
    RowCol,
    /// Aggregate each row (result is a column vector).
    Row,
    /// Aggregate each column (result is a row vector).
    Col,
}

/// Reorganization operators (data movement, no value change).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReorgKind {
    Trans,
    Diag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NaryKind {
    CBind,
    RBind,
    Plus,
}

/// Closed operator-kind tag; classification is a match over this enum, never
/// runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    Literal,
    TransientRead,
    TransientWrite,
    PersistentRead,
    MatMul,
    Binary(BinaryKind),
    AggUnary(AggDirection),
    Reorg(ReorgKind),
    Nary(NaryKind),
}

/// Value category of a node. Vectors are matrices with a unit dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    Scalar,
    Matrix,
}

#[derive(Debug, Clone)]
pub struct OpNode {
    pub name: String,
    pub kind: OpKind,
    pub data: DataKind,
    pub dims: Dims,
    inputs: Vec<NodeId>,
    consumers: Vec<NodeId>,
}

impl OpNode {
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn consumers(&self) -> &[NodeId] {
        &self.consumers
    }

    pub fn is_leaf(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn is_matrix(&self) -> bool {
        self.data == DataKind::Matrix
    }

    pub fn is_scalar(&self) -> bool {
        self.data == DataKind::Scalar
    }

    pub fn is_vector(&self) -> bool {
        self.is_matrix() && self.dims.is_vector()
    }

    /// Transient read/write ops are pure renames; together with a matching
    /// variable name they form alias links along which dims propagate.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, OpKind::TransientRead | OpKind::TransientWrite)
    }
}

#[derive(Debug, Default, Clone)]
pub struct OpGraph {
    nodes: Vec<OpNode>,
}

impl OpGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, kind: OpKind, data: DataKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(OpNode {
            name: name.into(),
            kind,
            data,
            dims: Dims::unknown(),
            inputs: Vec::new(),
            consumers: Vec::new(),
        });
        id
    }

    /// Add a matrix node with known dims in one step.
    pub fn add_matrix(&mut self, name: impl Into<String>, kind: OpKind, dims: Dims) -> NodeId {
        let id = self.add(name, kind, DataKind::Matrix);
        self.nodes[id.index()].dims = dims;
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &OpNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut OpNode {
        &mut self.nodes[id.index()]
    }

    pub fn input(&self, id: NodeId, i: usize) -> Result<NodeId> {
        self.node(id)
            .inputs
            .get(i)
            .copied()
            .ok_or_else(|| Error::Graph(format!("{id} has no input {i}")))
    }

    /// Append `child` to `parent`'s operand list and `parent` to `child`'s
    /// consumer list.
    pub fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].inputs.push(child);
        self.nodes[child.index()].consumers.push(parent);
    }

    /// Remove all operand links of `parent`, fixing up the consumer lists of
    /// its former children.
    pub fn unlink_inputs(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.nodes[parent.index()].inputs);
        for child in children {
            self.nodes[child.index()].consumers.retain(|&c| c != parent);
        }
    }

    /// Post-order traversal from `root` (children before parents). Shared
    /// subgraphs are visited once.
    pub fn post_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        self.post_order_rec(root, &mut visited, &mut order);
        order
    }

    fn post_order_rec(&self, id: NodeId, visited: &mut [bool], order: &mut Vec<NodeId>) {
        if visited[id.index()] {
            return;
        }
        visited[id.index()] = true;
        for &ch in &self.nodes[id.index()].inputs {
            self.post_order_rec(ch, visited, order);
        }
        order.push(id);
    }

    /// Copy known dims along alias edges: a transient read/write consumer
    /// sharing the producer's variable name takes over its dims, recursively
    /// for arbitrarily long rename chains.
    pub fn propagate_dims_to_aliases(&mut self, id: NodeId) {
        if !self.node(id).dims.fully_known() {
            return;
        }
        let mut work = vec![id];
        while let Some(cur) = work.pop() {
            let dims = self.node(cur).dims;
            let name = self.node(cur).name.clone();
            let consumers: Vec<NodeId> = self.node(cur).consumers.to_vec();
            for c in consumers {
                let cn = &mut self.nodes[c.index()];
                if cn.is_transient() && cn.name == name {
                    cn.dims = dims;
                    work.push(c);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_and_unlink_fix_both_sides() {
        let mut g = OpGraph::new();
        let a = g.add("a", OpKind::TransientRead, DataKind::Matrix);
        let b = g.add("b", OpKind::TransientRead, DataKind::Matrix);
        let m = g.add("m", OpKind::MatMul, DataKind::Matrix);
        g.link(m, a);
        g.link(m, b);
        assert_eq!(g.node(m).inputs(), &[a, b]);
        assert_eq!(g.node(a).consumers(), &[m]);

        g.unlink_inputs(m);
        assert!(g.node(m).inputs().is_empty());
        assert!(g.node(a).consumers().is_empty());
        assert!(g.node(b).consumers().is_empty());
    }

    #[test]
    fn post_order_children_first() {
        let mut g = OpGraph::new();
        let a = g.add("a", OpKind::TransientRead, DataKind::Matrix);
        let b = g.add("b", OpKind::TransientRead, DataKind::Matrix);
        let m = g.add("m", OpKind::MatMul, DataKind::Matrix);
        g.link(m, a);
        g.link(m, b);
        assert_eq!(g.post_order(m), vec![a, b, m]);
    }

    #[test]
    fn alias_propagation_follows_rename_chain() {
        let mut g = OpGraph::new();
        let src = g.add_matrix("x", OpKind::MatMul, Dims::with_nnz(4, 4, 7));
        let w = g.add("x", OpKind::TransientWrite, DataKind::Matrix);
        let r = g.add("x", OpKind::TransientRead, DataKind::Matrix);
        g.link(w, src);
        g.link(r, w);
        g.propagate_dims_to_aliases(src);
        assert_eq!(g.node(w).dims, Dims::with_nnz(4, 4, 7));
        assert_eq!(g.node(r).dims, Dims::with_nnz(4, 4, 7));
    }
}
