#![forbid(unsafe_code)]
//! mnc: sparsity-sketch-driven matrix multiplication chain optimization.
//!
//! Umbrella crate re-exporting the workspace members for hosts and tests.

pub use mnc_cache as cache;
pub use mnc_chain as chain;
pub use mnc_core as core;
pub use mnc_estim as estim;
pub use mnc_io as io;
pub use mnc_prop as prop;
