//! Shared name-to-sketch cache.
//!
//! One entry per live variable; overwritten on redefinition, removed when
//! liveness analysis says the variable is dead in all remaining regions. The
//! cache is an explicit object passed into every entry point, never ambient
//! global state, so tests can run with independent caches. Per-key get/put/
//! remove are individually atomic; concurrent regions never need cross-key
//! transactions, and same-key races resolve last-writer-wins.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use mnc_core::sketch::Sketch;

#[derive(Debug, Default)]
pub struct SketchCache {
    map: RwLock<HashMap<String, Arc<Sketch>>>,
}

impl SketchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Sketch>> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn put(&self, name: impl Into<String>, sketch: Arc<Sketch>) {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), sketch);
    }

    pub fn put_owned(&self, name: impl Into<String>, sketch: Sketch) {
        self.put(name, Arc::new(sketch));
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Sketch>> {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Drop every entry whose name fails the predicate. Idempotent for a
    /// fixed predicate.
    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|name, _| keep(name));
    }

    pub fn names(&self) -> Vec<String> {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.map
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove() {
        let cache = SketchCache::new();
        cache.put_owned("A", Sketch::from_counts(vec![1], vec![1]));
        assert!(cache.contains("A"));
        assert_eq!(cache.get("A").unwrap().nnz(), 1);
        cache.remove("A");
        assert!(cache.get("A").is_none());
    }

    #[test]
    fn redefinition_overwrites() {
        let cache = SketchCache::new();
        cache.put_owned("A", Sketch::from_counts(vec![1], vec![1]));
        cache.put_owned("A", Sketch::from_counts(vec![2], vec![1, 1]));
        assert_eq!(cache.get("A").unwrap().cols(), 2);
        assert_eq!(cache.len(), 1);
    }
}
