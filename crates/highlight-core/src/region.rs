//! Latest-highlight tracking per caller-chosen region

use crate::handle::HighlightHandle;
use std::collections::HashMap;
use std::hash::Hash;

/// Map from a region key to the most recent highlight applied there
///
/// Replacing a region's highlight releases the previous one first, so a
/// stale fade timer or snapshot never outlives its successor.
#[derive(Debug)]
pub struct RegionHighlights<K> {
    handles: HashMap<K, HighlightHandle>,
}

impl<K: Eq + Hash> Default for RegionHighlights<K> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> RegionHighlights<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the region's previous highlight, then track `next`
    ///
    /// `highlight` is called only after the previous handle has run, so it
    /// sees the region's original content.
    pub fn replace_with(
        &mut self,
        key: K,
        highlight: impl FnOnce() -> HighlightHandle,
    ) -> HighlightHandle {
        if let Some(previous) = self.handles.remove(&key) {
            previous.release();
        }
        self.prune();
        let handle = highlight();
        self.handles.insert(key, handle.clone());
        handle
    }

    /// Track an already-applied highlight, releasing the previous one
    pub fn replace(&mut self, key: K, handle: HighlightHandle) {
        if let Some(previous) = self.handles.insert(key, handle) {
            previous.release();
        }
        self.prune();
    }

    /// Forget regions whose highlight already expired or was released
    fn prune(&mut self) {
        self.handles.retain(|_, handle| handle.is_applied());
    }

    pub fn release(&mut self, key: &K) -> bool {
        match self.handles.remove(key) {
            Some(handle) => {
                handle.release();
                true
            }
            None => false,
        }
    }

    pub fn release_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.release();
        }
    }

    /// Number of regions whose highlight is still applied
    pub fn len(&self) -> usize {
        self.handles.values().filter(|h| h.is_applied()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K> Drop for RegionHighlights<K> {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.release();
        }
    }
}
