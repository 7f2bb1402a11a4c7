//! Post-execution sketch refresh from concrete results.
//!
//! After a region executes, every matrix it wrote gets a fresh, exact cache
//! entry: directly from the nonzero layout for in-memory data, or by
//! aggregating per-partition count vectors for partitioned data. The
//! partition combiner is an elementwise integer sum, commutative and
//! associative, so results do not depend on reduction order.

use std::collections::BTreeMap;

use mnc_core::error::Result;
use mnc_core::sketch::Sketch;

/// Count contribution of one partition of a distributed matrix.
#[derive(Debug, Clone)]
pub struct PartitionCounts {
    /// Block coordinate along the row axis.
    pub row_coord: u64,
    /// Block coordinate along the column axis.
    pub col_coord: u64,
    pub row_counts: Vec<u64>,
    pub col_counts: Vec<u64>,
}

/// Concrete nonzero information for one executed matrix.
#[derive(Debug, Clone)]
pub enum NnzLayout {
    Exact {
        rows: u64,
        cols: u64,
        cells: Vec<(u64, u64)>,
    },
    Partitioned(Vec<PartitionCounts>),
}

/// Host execution contract: look up the materialized result of a variable.
pub trait ExecutionResults {
    fn matrix(&self, name: &str) -> Option<NnzLayout>;
}

/// Merge per-partition count vectors: vectors sharing a coordinate combine
/// by elementwise sum, then all coordinates concatenate in ascending order.
pub fn combine_partition_counts<I>(parts: I) -> Vec<u64>
where
    I: IntoIterator<Item = (u64, Vec<u64>)>,
{
    let mut by_coord: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for (coord, counts) in parts {
        match by_coord.get_mut(&coord) {
            Some(acc) => {
                if acc.len() < counts.len() {
                    acc.resize(counts.len(), 0);
                }
                for (a, c) in acc.iter_mut().zip(counts) {
                    *a += c;
                }
            }
            None => {
                by_coord.insert(coord, counts);
            }
        }
    }
    by_coord.into_values().flatten().collect()
}

/// Build a sketch from a materialized layout. Returns `None` for layouts
/// with no usable counts (e.g. an empty partition stream).
pub fn sketch_from_layout(layout: NnzLayout) -> Result<Option<Sketch>> {
    match layout {
        NnzLayout::Exact { rows, cols, cells } => {
            Ok(Some(Sketch::from_cells(rows, cols, cells)?))
        }
        NnzLayout::Partitioned(parts) => {
            let rows = combine_partition_counts(
                parts
                    .iter()
                    .map(|p| (p.row_coord, p.row_counts.clone())),
            );
            let cols = combine_partition_counts(
                parts
                    .into_iter()
                    .map(|p| (p.col_coord, p.col_counts)),
            );
            if rows.is_empty() || cols.is_empty() {
                return Ok(None);
            }
            Ok(Some(Sketch::from_counts(rows, cols)))
        }
    }
}
