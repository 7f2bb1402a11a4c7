//! Per-matrix nonzero-count sketches.
//!
//! A `Sketch` summarizes a matrix by its per-row and per-column nonzero
//! counts. It is cheap to build, cheap to combine, and drives both the
//! multiply-chain cost metric (a dot product over the inner dimension) and
//! output-sparsity estimation. Sketches derived by the estimator are
//! approximations: row and column sums only approximately agree, and callers
//! must not assume exactness.

use serde::{Deserialize, Serialize};

use crate::dims::Dims;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sketch {
    row_counts: Vec<u64>,
    col_counts: Vec<u64>,
    nnz: u64,
}

impl Sketch {
    /// Build from raw count arrays. The nonzero total is taken from the row
    /// side, matching the exact-sketch invariant sum(rows) == sum(cols).
    pub fn from_counts(row_counts: Vec<u64>, col_counts: Vec<u64>) -> Self {
        let nnz = row_counts.iter().sum();
        Self {
            row_counts,
            col_counts,
            nnz,
        }
    }

    /// Build from estimated count arrays with an explicitly estimated total.
    /// The arrays need not sum to `nnz` exactly.
    pub fn from_estimate(row_counts: Vec<u64>, col_counts: Vec<u64>, nnz: u64) -> Self {
        Self {
            row_counts,
            col_counts,
            nnz,
        }
    }

    /// Exact sketch from a nonzero-coordinate layout.
    pub fn from_cells<I>(rows: u64, cols: u64, cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut row_counts = vec![0u64; rows as usize];
        let mut col_counts = vec![0u64; cols as usize];
        for (r, c) in cells {
            if r >= rows || c >= cols {
                return Err(Error::Sketch(format!(
                    "cell ({r},{c}) out of bounds for {rows}x{cols}"
                )));
            }
            row_counts[r as usize] += 1;
            col_counts[c as usize] += 1;
        }
        Ok(Self::from_counts(row_counts, col_counts))
    }

    pub fn rows(&self) -> u64 {
        self.row_counts.len() as u64
    }

    pub fn cols(&self) -> u64 {
        self.col_counts.len() as u64
    }

    pub fn nnz(&self) -> u64 {
        self.nnz
    }

    pub fn row_counts(&self) -> &[u64] {
        &self.row_counts
    }

    pub fn col_counts(&self) -> &[u64] {
        &self.col_counts
    }

    pub fn dims(&self) -> Dims {
        Dims::with_nnz(self.rows(), self.cols(), self.nnz)
    }

    pub fn sparsity(&self) -> f64 {
        let cells = self.rows().saturating_mul(self.cols());
        if cells == 0 {
            0.0
        } else {
            self.nnz as f64 / cells as f64
        }
    }

    /// Largest per-row count. Rows with at most one nonzero admit exact
    /// multiply estimates.
    pub fn max_row_count(&self) -> u64 {
        self.row_counts.iter().copied().max().unwrap_or(0)
    }

    pub fn max_col_count(&self) -> u64 {
        self.col_counts.iter().copied().max().unwrap_or(0)
    }
}
