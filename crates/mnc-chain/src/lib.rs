#![forbid(unsafe_code)]
//! mnc-chain: cost-optimal reassociation of matrix multiplication chains.
//!
//! Design:
//! - `collect` finds maximal chains in the operator graph.
//! - `dp` runs the memoized O(n^3) search over associations with
//!   sketch-derived costs.
//! - `relink` rewires the pooled multiply operators to the chosen tree.
//! - `rewrite` ties the three together as a whole-graph pass.

pub mod collect;
pub mod dp;
pub mod relink;
pub mod rewrite;

pub use collect::{collect_chain, is_chain_top, Chain};
pub use dp::{optimize_chain, ChainPlan};
pub use relink::relink_chain;
pub use rewrite::optimize_mm_chains;
