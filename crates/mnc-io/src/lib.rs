#![forbid(unsafe_code)]
//! mnc-io: persisted sketch storage.
//!
//! Format: one row count per line, a sentinel line, then one column count
//! per line. When the underlying data is partitioned the sketch is sharded
//! into `part*` files inside a directory; shards merge in filename sort
//! order. Loads are explicit, so unlike the in-compiler estimation paths a
//! malformed or unreachable file is a hard error.

pub mod store;

pub use store::{load_sketch, store_sketch, Error, Result};
