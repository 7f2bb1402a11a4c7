//! Convenient re-exports for downstream crates.

pub use crate::config::OptimizerConfig;
pub use crate::dims::Dims;
pub use crate::error::{Error, Result};
pub use crate::graph::{
    AggDirection, BinaryKind, DataKind, NaryKind, NodeId, OpGraph, OpKind, OpNode, ReorgKind,
};
pub use crate::sketch::Sketch;
