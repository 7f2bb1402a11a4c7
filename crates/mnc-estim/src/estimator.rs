//! Pairwise sparsity estimation over nonzero-count sketches.
//!
//! The multiply model follows the MNC approach: the dot product of the left
//! operand's column counts and the right operand's row counts over the shared
//! inner dimension is both the cost metric and the input to output-sparsity
//! derivation, assuming independence of inner-dimension contributions. All
//! other operators combine per-row/per-column counts under the standard
//! independence assumption on cell presence. Every result is an
//! approximation; only dimensions are reliable.

use mnc_core::error::{Error, Result};
use mnc_core::sketch::Sketch;

use crate::opcode::OpCode;

/// Output of one pairwise estimation: the derived sketch and the estimated
/// work for the operation itself (exclusive of its inputs).
#[derive(Debug, Clone)]
pub struct Estimate {
    pub sketch: Sketch,
    pub cost: u128,
}

/// Multiply cost metric: sum over the inner dimension of colA[k] * rowB[k].
/// u128 accumulation; O(n^3) DP sums over these never overflow.
pub fn matmul_cost(lhs: &Sketch, rhs: &Sketch) -> u128 {
    lhs.col_counts()
        .iter()
        .zip(rhs.row_counts())
        .map(|(&c, &r)| c as u128 * r as u128)
        .sum()
}

/// Estimate the output sketch and cost of `op` applied to `lhs` (and `rhs`
/// for binary ops). Dimension mismatches and missing operands are errors;
/// callers that must not abort fall back to dimension-only inference.
pub fn estimate(lhs: &Sketch, rhs: Option<&Sketch>, op: OpCode) -> Result<Estimate> {
    match op {
        OpCode::MatMul => estim_matmul(lhs, binary_rhs(rhs, op)?),
        OpCode::ElemMult => estim_elem_mult(lhs, binary_rhs(rhs, op)?),
        OpCode::ElemPlus => estim_elem_plus(lhs, binary_rhs(rhs, op)?),
        OpCode::CBind => estim_cbind(lhs, binary_rhs(rhs, op)?),
        OpCode::RBind => estim_rbind(lhs, binary_rhs(rhs, op)?),
        OpCode::Trans => Ok(estim_trans(lhs)),
        OpCode::Diag => estim_diag(lhs),
    }
}

fn binary_rhs<'a>(rhs: Option<&'a Sketch>, op: OpCode) -> Result<&'a Sketch> {
    rhs.ok_or_else(|| Error::Sketch(format!("{op:?} requires a right operand")))
}

fn estim_matmul(lhs: &Sketch, rhs: &Sketch) -> Result<Estimate> {
    if lhs.cols() != rhs.rows() {
        return Err(Error::Dims(format!(
            "matmul {}x{} * {}x{}",
            lhs.rows(),
            lhs.cols(),
            rhs.rows(),
            rhs.cols()
        )));
    }
    let cost = matmul_cost(lhs, rhs);
    let m = lhs.rows();
    let n = rhs.cols();
    let mn = m as u128 * n as u128;

    // With at most one nonzero per left row (or right column) no additive
    // collisions can occur and the dot product is the exact output count.
    let nnz = if lhs.max_row_count() <= 1 || rhs.max_col_count() <= 1 {
        cost.min(mn) as u64
    } else {
        let mut sp = 0.0f64;
        for (&c, &r) in lhs.col_counts().iter().zip(rhs.row_counts()) {
            let lsp = (c as f64 * r as f64) / mn as f64;
            sp = sp + lsp - sp * lsp;
        }
        (sp * mn as f64).round() as u64
    };

    // Redistribute the estimated total along the operands' outer count
    // profiles, clamped to the orthogonal dimension.
    let row_counts = scale_counts(lhs.row_counts(), lhs.nnz(), nnz, n);
    let col_counts = scale_counts(rhs.col_counts(), rhs.nnz(), nnz, m);
    Ok(Estimate {
        sketch: Sketch::from_estimate(row_counts, col_counts, nnz),
        cost,
    })
}

fn scale_counts(counts: &[u64], from_nnz: u64, to_nnz: u64, cap: u64) -> Vec<u64> {
    if from_nnz == 0 {
        return vec![0; counts.len()];
    }
    let scale = to_nnz as f64 / from_nnz as f64;
    counts
        .iter()
        .map(|&c| ((c as f64 * scale).round() as u64).min(cap))
        .collect()
}

fn check_same_dims(lhs: &Sketch, rhs: &Sketch, what: &str) -> Result<()> {
    if lhs.rows() != rhs.rows() || lhs.cols() != rhs.cols() {
        return Err(Error::Dims(format!(
            "{what} {}x{} vs {}x{}",
            lhs.rows(),
            lhs.cols(),
            rhs.rows(),
            rhs.cols()
        )));
    }
    Ok(())
}

fn estim_elem_mult(lhs: &Sketch, rhs: &Sketch) -> Result<Estimate> {
    check_same_dims(lhs, rhs, "elementwise multiply")?;
    let (m, n) = (lhs.rows(), lhs.cols());
    // Expected intersection of per-row (per-column) nonzero positions.
    let row_counts: Vec<u64> = lhs
        .row_counts()
        .iter()
        .zip(rhs.row_counts())
        .map(|(&a, &b)| ((a as f64 * b as f64) / n as f64).round() as u64)
        .collect();
    let col_counts: Vec<u64> = lhs
        .col_counts()
        .iter()
        .zip(rhs.col_counts())
        .map(|(&a, &b)| ((a as f64 * b as f64) / m as f64).round() as u64)
        .collect();
    let nnz = (lhs.sparsity() * rhs.sparsity() * (m as f64 * n as f64)).round() as u64;
    let cost = lhs.nnz().min(rhs.nnz()) as u128;
    Ok(Estimate {
        sketch: Sketch::from_estimate(row_counts, col_counts, nnz),
        cost,
    })
}

fn estim_elem_plus(lhs: &Sketch, rhs: &Sketch) -> Result<Estimate> {
    check_same_dims(lhs, rhs, "elementwise add")?;
    let (m, n) = (lhs.rows(), lhs.cols());
    // Inclusion-exclusion per row (per column).
    let row_counts: Vec<u64> = lhs
        .row_counts()
        .iter()
        .zip(rhs.row_counts())
        .map(|(&a, &b)| {
            let both = (a as f64 * b as f64) / n as f64;
            ((a as f64 + b as f64 - both).round() as u64).min(n)
        })
        .collect();
    let col_counts: Vec<u64> = lhs
        .col_counts()
        .iter()
        .zip(rhs.col_counts())
        .map(|(&a, &b)| {
            let both = (a as f64 * b as f64) / m as f64;
            ((a as f64 + b as f64 - both).round() as u64).min(m)
        })
        .collect();
    let sp = lhs.sparsity() + rhs.sparsity() - lhs.sparsity() * rhs.sparsity();
    let nnz = (sp * (m as f64 * n as f64)).round() as u64;
    let cost = lhs.nnz() as u128 + rhs.nnz() as u128;
    Ok(Estimate {
        sketch: Sketch::from_estimate(row_counts, col_counts, nnz),
        cost,
    })
}

fn estim_cbind(lhs: &Sketch, rhs: &Sketch) -> Result<Estimate> {
    if lhs.rows() != rhs.rows() {
        return Err(Error::Dims(format!(
            "cbind row mismatch {} vs {}",
            lhs.rows(),
            rhs.rows()
        )));
    }
    let row_counts: Vec<u64> = lhs
        .row_counts()
        .iter()
        .zip(rhs.row_counts())
        .map(|(&a, &b)| a + b)
        .collect();
    let mut col_counts = lhs.col_counts().to_vec();
    col_counts.extend_from_slice(rhs.col_counts());
    let nnz = lhs.nnz() + rhs.nnz();
    Ok(Estimate {
        sketch: Sketch::from_estimate(row_counts, col_counts, nnz),
        cost: nnz as u128,
    })
}

fn estim_rbind(lhs: &Sketch, rhs: &Sketch) -> Result<Estimate> {
    if lhs.cols() != rhs.cols() {
        return Err(Error::Dims(format!(
            "rbind col mismatch {} vs {}",
            lhs.cols(),
            rhs.cols()
        )));
    }
    let mut row_counts = lhs.row_counts().to_vec();
    row_counts.extend_from_slice(rhs.row_counts());
    let col_counts: Vec<u64> = lhs
        .col_counts()
        .iter()
        .zip(rhs.col_counts())
        .map(|(&a, &b)| a + b)
        .collect();
    let nnz = lhs.nnz() + rhs.nnz();
    Ok(Estimate {
        sketch: Sketch::from_estimate(row_counts, col_counts, nnz),
        cost: nnz as u128,
    })
}

fn estim_trans(lhs: &Sketch) -> Estimate {
    let sketch = Sketch::from_estimate(
        lhs.col_counts().to_vec(),
        lhs.row_counts().to_vec(),
        lhs.nnz(),
    );
    Estimate {
        sketch,
        cost: lhs.nnz() as u128,
    }
}

fn estim_diag(lhs: &Sketch) -> Result<Estimate> {
    if lhs.cols() == 1 {
        // Vector to diagonal matrix: each entry lands on the diagonal.
        let counts: Vec<u64> = lhs.row_counts().iter().map(|&c| c.min(1)).collect();
        let nnz = counts.iter().sum();
        return Ok(Estimate {
            sketch: Sketch::from_estimate(counts.clone(), counts, nnz),
            cost: nnz as u128,
        });
    }
    if lhs.rows() != lhs.cols() {
        return Err(Error::Dims(format!(
            "diag extraction requires a square input, got {}x{}",
            lhs.rows(),
            lhs.cols()
        )));
    }
    // Matrix to diagonal vector: a nonempty row is assumed to hit its
    // diagonal cell (upper bound).
    let row_counts: Vec<u64> = lhs.row_counts().iter().map(|&c| c.min(1)).collect();
    let nnz: u64 = row_counts.iter().sum();
    Ok(Estimate {
        sketch: Sketch::from_estimate(row_counts, vec![nnz], nnz),
        cost: nnz as u128,
    })
}
