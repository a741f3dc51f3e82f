use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::trace;
use xxhash_rust::xxh3::xxh3_64;

use crate::layout::GridLayoutEngine;
use crate::models::{AspectRatioStore, GalleryItem, GridLayout};

/// Default number of cached layouts kept in memory.
pub const DEFAULT_CACHE_ENTRIES: usize = 8;

/// Key for the layout cache: everything a layout is a function of.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct CacheKey {
    pub column_count: usize,
    pub list_hash: u64,
    pub store_revision: u64,
}

/// Memoized grid layouts.
///
/// Entries are whole layouts keyed by (column count, item list hash, store revision).
/// Nothing is ever patched in place: a new measurement bumps the store revision, the
/// next lookup misses and the grid is re-packed from scratch. Hits come from flipping
/// between grid views and from re-rendering without new measurements.
///
/// A cache is only meaningful against the single store it was filled from, since
/// revisions of different stores are unrelated.
pub struct LayoutCache {
    cache: Mutex<LruCache<CacheKey, Arc<GridLayout>>>,
}

impl LayoutCache {
    /// Creates a cache holding at most `capacity` layouts (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Computes a fast hash of the item list.
    /// The hash covers id and fallback ratio of each item in order, so any change to the
    /// list, its order or a designer ratio invalidates the entry.
    pub fn compute_list_hash(items: &[GalleryItem]) -> u64 {
        let mut hasher_input = Vec::with_capacity(items.len() * 32);

        for item in items {
            hasher_input.extend_from_slice(item.id.as_str().as_bytes());
            // Separator so ids "ab","c" and "a","bc" differ
            hasher_input.push(0);
            let ratio = item.fallback_ratio().unwrap_or(0.0);
            hasher_input.extend_from_slice(&ratio.to_bits().to_le_bytes());
        }

        xxh3_64(&hasher_input)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<GridLayout>> {
        self.cache.lock().get(key).cloned()
    }

    pub fn set(&self, key: CacheKey, layout: Arc<GridLayout>) {
        self.cache.lock().put(key, layout);
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_ENTRIES)
    }
}

/// Combines layout computation with caching.
pub struct CachedLayoutComputer {
    pub engine: GridLayoutEngine,
    pub cache: LayoutCache,
}

impl CachedLayoutComputer {
    pub fn new(engine: GridLayoutEngine, capacity: usize) -> Self {
        Self {
            engine,
            cache: LayoutCache::new(capacity),
        }
    }

    /// Returns the layout for these inputs, computing it on a miss.
    pub fn compute(
        &self,
        column_count: usize,
        items: &[GalleryItem],
        ratios: &AspectRatioStore,
    ) -> Arc<GridLayout> {
        let key = CacheKey {
            column_count: column_count.max(1),
            list_hash: LayoutCache::compute_list_hash(items),
            store_revision: ratios.revision(),
        };

        if let Some(layout) = self.cache.get(&key) {
            trace!(?key, "Layout cache hit");
            return layout;
        }

        trace!(?key, items = items.len(), "Layout cache miss");
        let layout = Arc::new(self.engine.compute(column_count, items, ratios));
        self.cache.set(key, Arc::clone(&layout));
        layout
    }

    pub fn invalidate(&self) {
        self.cache.clear();
    }
}

impl Default for CachedLayoutComputer {
    fn default() -> Self {
        Self::new(GridLayoutEngine::default(), DEFAULT_CACHE_ENTRIES)
    }
}
