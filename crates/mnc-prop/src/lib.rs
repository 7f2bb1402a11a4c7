#![forbid(unsafe_code)]
//! mnc-prop: sketch and dimension propagation over operator graphs.
//!
//! Design:
//! - `Propagator` walks DAGs post-order, deriving each node's sketch from
//!   its operands' cache entries where a model exists and falling back to
//!   dimension-only inference where it does not.
//! - The `SkipChainInteriors` traversal seeds multiply chains' leaves while
//!   leaving the chain interiors to the chain optimizer.

pub mod infer;
pub mod propagate;

pub use infer::infer_dims;
pub use propagate::{Propagator, Traversal};
