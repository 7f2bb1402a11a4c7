#![forbid(unsafe_code)]
//! mnc-core: value types shared by the sparsity-aware optimizer.
//!
//! Design:
//! - `Sketch` is an immutable per-matrix nonzero-count summary.
//! - `OpGraph` is an index-addressed arena mirroring the host compiler's
//!   operator DAG (operand and consumer lists both ways).
//! - `Dims` is the shape/nnz metadata contract with the host.
//!
//! NOTE: We deliberately keep core free of I/O, estimation, and caching;
//! those live in the downstream crates.

pub mod config;
pub mod dims;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod sketch;

pub use config::OptimizerConfig;
pub use dims::Dims;
pub use error::{Error, Result};
pub use graph::{AggDirection, BinaryKind, DataKind, NaryKind, NodeId, OpGraph, OpKind, OpNode, ReorgKind};
pub use sketch::Sketch;
