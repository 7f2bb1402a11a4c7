//! Matrix shape metadata carried on every operator node.
//!
//! Dims is the narrow contract between the optimizer and the surrounding
//! compiler: rows/cols plus an optional nonzero count. A node whose nnz is
//! unknown can still participate in shape inference; sparsity-aware paths
//! require `fully_known`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims {
    pub rows: u64,
    pub cols: u64,
    pub nnz: Option<u64>,
}

impl Dims {
    pub const fn new(rows: u64, cols: u64) -> Self {
        Self {
            rows,
            cols,
            nnz: None,
        }
    }

    pub const fn with_nnz(rows: u64, cols: u64, nnz: u64) -> Self {
        Self {
            rows,
            cols,
            nnz: Some(nnz),
        }
    }

    /// Unknown shape placeholder (rows == cols == 0).
    pub const fn unknown() -> Self {
        Self::new(0, 0)
    }

    /// Rows and cols are known.
    pub fn shape_known(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }

    /// Rows, cols, and nnz are all known.
    pub fn fully_known(&self) -> bool {
        self.shape_known() && self.nnz.is_some()
    }

    pub fn cells(&self) -> u64 {
        self.rows.saturating_mul(self.cols)
    }

    pub fn sparsity(&self) -> Option<f64> {
        match (self.nnz, self.cells()) {
            (Some(nnz), cells) if cells > 0 => Some(nnz as f64 / cells as f64),
            _ => None,
        }
    }

    /// True when either dimension is 1 (row or column vector).
    pub fn is_vector(&self) -> bool {
        self.shape_known() && (self.rows == 1 || self.cols == 1)
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nnz {
            Some(nnz) => write!(f, "{}x{} [{}]", self.rows, self.cols, nnz),
            None => write!(f, "{}x{} [?]", self.rows, self.cols),
        }
    }
}
