//! Optimizer configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Use sketch-based costs for multiply-chain reordering. When disabled,
    /// chains are left in their original association.
    pub sparsity_chain_opt: bool,

    /// Smallest chain (number of operands) worth reordering. Chains below
    /// this bypass the DP search entirely.
    pub min_chain_length: usize,

    /// Propagate sketches across non-chain operators before chain
    /// optimization.
    pub propagate_sketches: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            sparsity_chain_opt: true,
            min_chain_length: 2,
            propagate_sketches: true,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.min_chain_length < 2 {
            return Err(crate::error::Error::Config(
                "min_chain_length must be at least 2".into(),
            ));
        }
        Ok(())
    }
}
