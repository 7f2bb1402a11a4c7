//! Transient estimation nodes for multiply chains.
//!
//! A `ChainNode` is either a leaf wrapping one operand's sketch or an
//! internal pairing of two sub-chains. The derived sketch (`synopsis`) is
//! computed at most once per node identity and never mutated afterwards, so
//! revisiting the same pairing during the DP search costs nothing.

use once_cell::unsync::OnceCell;
use std::rc::Rc;

use mnc_core::dims::Dims;
use mnc_core::error::{Error, Result};
use mnc_core::sketch::Sketch;

use crate::estimator::estimate;
use crate::opcode::OpCode;

#[derive(Debug)]
pub struct ChainNode {
    op: Option<OpCode>,
    left: Option<Rc<ChainNode>>,
    right: Option<Rc<ChainNode>>,
    synopsis: OnceCell<Sketch>,
}

impl ChainNode {
    /// Leaf node; its synopsis is the operand's sketch itself.
    pub fn leaf(sketch: Sketch) -> Rc<Self> {
        let synopsis = OnceCell::new();
        let _ = synopsis.set(sketch);
        Rc::new(Self {
            op: None,
            left: None,
            right: None,
            synopsis,
        })
    }

    /// Internal node pairing two sub-chains under `op`.
    pub fn pair(left: Rc<ChainNode>, right: Rc<ChainNode>, op: OpCode) -> Rc<Self> {
        Rc::new(Self {
            op: Some(op),
            left: Some(left),
            right: Some(right),
            synopsis: OnceCell::new(),
        })
    }

    pub fn is_leaf(&self) -> bool {
        self.op.is_none()
    }

    pub fn left(&self) -> Option<&Rc<ChainNode>> {
        self.left.as_ref()
    }

    pub fn right(&self) -> Option<&Rc<ChainNode>> {
        self.right.as_ref()
    }

    /// The node's derived sketch, estimating lazily on first access.
    pub fn synopsis(&self) -> Result<&Sketch> {
        self.synopsis.get_or_try_init(|| {
            // Leaves set the cell in their constructor, so only internal
            // nodes reach this closure.
            let (Some(op), Some(lhs), Some(rhs)) = (self.op, &self.left, &self.right) else {
                return Err(Error::Invariant("leaf node without a synopsis".into()));
            };
            Ok(estimate(lhs.synopsis()?, Some(rhs.synopsis()?), op)?.sketch)
        })
    }

    pub fn dims(&self) -> Result<Dims> {
        Ok(self.synopsis()?.dims())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synopsis_computed_once_and_stable() {
        let a = ChainNode::leaf(Sketch::from_counts(vec![1, 1], vec![1, 1]));
        let b = ChainNode::leaf(Sketch::from_counts(vec![2, 0], vec![1, 1]));
        let p = ChainNode::pair(a, b, OpCode::MatMul);
        let first = p.synopsis().unwrap().clone();
        let second = p.synopsis().unwrap();
        assert_eq!(&first, second);
    }

    #[test]
    fn leaf_synopsis_is_the_operand_sketch() {
        let s = Sketch::from_counts(vec![1, 2], vec![2, 1]);
        let leaf = ChainNode::leaf(s.clone());
        assert!(leaf.is_leaf());
        assert_eq!(leaf.synopsis().unwrap(), &s);
    }
}
