//! Cache lifecycle across sequential program regions.
//!
//! For region i the governor prunes entries dead in every remaining region,
//! seeds the region's leaf reads with cached dims/nnz, hands compilation to
//! the host, prunes again against the narrower tail starting at i+1, and
//! after execution refreshes entries for the region's live-out writes.

use std::collections::HashSet;

use tracing::{debug, trace};

use mnc_core::graph::{NodeId, OpGraph, OpKind};

use crate::cache::SketchCache;
use crate::refresh::{sketch_from_layout, ExecutionResults};

/// Liveness facts for one region, computed by the host's analysis.
#[derive(Debug, Clone, Default)]
pub struct RegionLiveness {
    pub reads: HashSet<String>,
    pub live_in: HashSet<String>,
    pub live_out: HashSet<String>,
}

/// One sequential program region: its operator graph, the graph's roots
/// (one per variable write), and its liveness facts.
#[derive(Debug)]
pub struct Region {
    pub graph: OpGraph,
    pub roots: Vec<NodeId>,
    pub liveness: RegionLiveness,
}

#[derive(Debug, Default)]
pub struct CacheGovernor;

impl CacheGovernor {
    pub fn new() -> Self {
        Self
    }

    /// Delete entries for names not read or live-in anywhere in `regions`.
    /// Idempotent for an unchanged region tail.
    pub fn prune(&self, cache: &SketchCache, regions: &[Region]) {
        let mut live: HashSet<&str> = HashSet::new();
        for r in regions {
            live.extend(r.liveness.reads.iter().map(String::as_str));
            live.extend(r.liveness.live_in.iter().map(String::as_str));
        }
        let before = cache.len();
        cache.retain(|name| live.contains(name));
        debug!(
            removed = before - cache.len(),
            remaining = cache.len(),
            "pruned sketch cache"
        );
    }

    /// Copy cached dims/nnz onto every leaf the region reads, propagating
    /// along alias chains.
    pub fn seed(&self, cache: &SketchCache, region: &mut Region) {
        for i in 0..region.roots.len() {
            let root = region.roots[i];
            for id in region.graph.post_order(root) {
                let node = region.graph.node(id);
                if !node.is_leaf() || !region.liveness.reads.contains(&node.name) {
                    continue;
                }
                if let Some(sketch) = cache.get(&node.name) {
                    trace!(name = %node.name, dims = %sketch.dims(), "seeding leaf read");
                    region.graph.node_mut(id).dims = sketch.dims();
                    region.graph.propagate_dims_to_aliases(id);
                }
            }
        }
    }

    /// Full per-region preparation: prune with the tail starting at `i`,
    /// seed region i, delegate compilation to the host, prune with the tail
    /// starting at `i + 1`.
    pub fn prepare_region<F>(&self, cache: &SketchCache, regions: &mut [Region], i: usize, compile: F)
    where
        F: FnOnce(&mut Region),
    {
        self.prune(cache, &regions[i..]);
        self.seed(cache, &mut regions[i]);
        compile(&mut regions[i]);
        if i + 1 < regions.len() {
            self.prune(cache, &regions[i + 1..]);
        }
    }

    /// Refresh cache entries from the region's execution results. Trivial
    /// alias writes copy the source entry under the new name; every other
    /// live-out matrix write is recounted from its materialized data.
    pub fn refresh(&self, cache: &SketchCache, region: &Region, results: &dyn ExecutionResults) {
        let mut written: HashSet<&str> = HashSet::new();
        for &root in &region.roots {
            let node = region.graph.node(root);
            if !node.is_matrix() {
                continue;
            }
            if let [only] = node.inputs() {
                let src = region.graph.node(*only);
                let src_is_data = matches!(
                    src.kind,
                    OpKind::TransientRead | OpKind::TransientWrite | OpKind::PersistentRead
                );
                if src_is_data {
                    if src.name != node.name {
                        if let Some(sketch) = cache.get(&src.name) {
                            cache.put(&node.name, sketch);
                        }
                    }
                    continue;
                }
            }
            written.insert(node.name.as_str());
        }

        for name in &region.liveness.live_out {
            if !written.contains(name.as_str()) {
                continue;
            }
            let Some(layout) = results.matrix(name) else {
                continue;
            };
            match sketch_from_layout(layout) {
                Ok(Some(sketch)) => {
                    trace!(name = %name, dims = %sketch.dims(), "refreshed sketch");
                    cache.put_owned(name.clone(), sketch);
                }
                Ok(None) => {}
                Err(e) => debug!(name = %name, error = %e, "skipping sketch refresh"),
            }
        }
    }
}
