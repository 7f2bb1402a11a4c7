#![forbid(unsafe_code)]
//! mnc-cache: the cross-operation sketch cache and its lifecycle.
//!
//! Design:
//! - `SketchCache` is a concurrency-safe name-to-sketch map with per-key
//!   atomic operations (no cross-key transactions needed).
//! - `CacheGovernor` ties the cache to variable liveness across sequential
//!   regions: prune, seed, delegate, prune, refresh.
//! - `refresh` holds the execution contract and the order-independent
//!   partition combiner.

pub mod cache;
pub mod governor;
pub mod refresh;

pub use cache::SketchCache;
pub use governor::{CacheGovernor, Region, RegionLiveness};
pub use refresh::{
    combine_partition_counts, sketch_from_layout, ExecutionResults, NnzLayout, PartitionCounts,
};
