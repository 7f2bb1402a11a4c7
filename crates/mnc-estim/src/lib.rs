#![forbid(unsafe_code)]
//! mnc-estim: sketch-based sparsity estimation.
//!
//! Design:
//! - `estimate` maps operand sketches + an `OpCode` to an output sketch and
//!   a cost metric (for multiply: the inner-dimension count dot product).
//! - `ChainNode` memoizes derived sketches per distinct pairing, which keeps
//!   the O(n^3) chain search from re-estimating identical sub-chains.
//! - `ScalarMixPolicy` isolates the provisional scalar/vector rule.

pub mod estimator;
pub mod node;
pub mod opcode;
pub mod policy;

pub use estimator::{estimate, matmul_cost, Estimate};
pub use node::ChainNode;
pub use opcode::{classify, OpCode};
pub use policy::{DeclineMixed, PreserveMatrixSparsity, ScalarMixPolicy};
