//! Memoization of contour results, keyed by the normalized parameter tuple.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::tile::TileContours;

/// Normalized cache key: step size, max nodes per way, zero exclusion,
/// level overrides, and the simplification epsilon as raw bits (`None`
/// when simplification is disabled).
pub(crate) type ParamKey = (i32, u64, bool, Option<i32>, Option<i32>, Option<u64>);

/// Statistics about the contour memo cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheInner {
    results: HashMap<ParamKey, Arc<TileContours>>,
    hits: u64,
    misses: u64,
}

/// Append-only memo cache for contour results.
///
/// The lock is held for the whole duration of a miss computation, so a
/// concurrent caller with the same parameters blocks until the first
/// finishes and then reuses its result: at most one computation runs per
/// distinct key. There is no eviction; the underlying grid is immutable
/// and the cache lives as long as the tile.
pub(crate) struct ContourCache {
    inner: Mutex<CacheInner>,
}

impl ContourCache {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                results: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Return the cached result for `key`, or run `compute` and cache its
    /// output. A failed computation caches nothing.
    pub(crate) fn get_or_compute(
        &self,
        key: ParamKey,
        compute: impl FnOnce() -> Result<TileContours>,
    ) -> Result<Arc<TileContours>> {
        let mut inner = self.inner.lock().expect("contour cache poisoned");

        if let Some(result) = inner.results.get(&key) {
            let result = Arc::clone(result);
            inner.hits += 1;
            return Ok(result);
        }

        let result = Arc::new(compute()?);
        inner.misses += 1;
        inner.results.insert(key, Arc::clone(&result));
        Ok(result)
    }

    pub(crate) fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("contour cache poisoned");
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.results.len(),
        }
    }
}
