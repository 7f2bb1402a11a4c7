//! Policy for elementwise binaries mixing a matrix with a scalar/vector.
//!
//! The default assumes the scalar or vector operand does not alter the
//! matrix operand's sparsity. That is known to be inexact (a scalar add
//! densifies, a zero scalar multiply empties), so the rule is a named,
//! swappable policy rather than a hard-coded truth.

use mnc_core::sketch::Sketch;

pub trait ScalarMixPolicy {
    /// Sketch for the result of an elementwise binary between `matrix` and a
    /// scalar/vector operand. `None` declines, sending the caller to
    /// dimension-only inference.
    fn mix(&self, matrix: &Sketch) -> Option<Sketch>;
}

/// Provisional default: the matrix operand's sketch carries over unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveMatrixSparsity;

impl ScalarMixPolicy for PreserveMatrixSparsity {
    fn mix(&self, matrix: &Sketch) -> Option<Sketch> {
        Some(matrix.clone())
    }
}

/// Opt-out policy: never derive a sketch for mixed binaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineMixed;

impl ScalarMixPolicy for DeclineMixed {
    fn mix(&self, _matrix: &Sketch) -> Option<Sketch> {
        None
    }
}
