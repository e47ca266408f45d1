use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use hashbrown::HashMap;
use loam_world::FalloffMask;

#[derive(Clone, Copy, Debug, Default)]
pub struct FalloffCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Falloff masks keyed by edge size. A mask depends only on its size, so entries never go stale.
pub struct FalloffCache {
    entries: RwLock<HashMap<usize, Arc<FalloffMask>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FalloffCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get_or_generate(&self, size: usize) -> Arc<FalloffMask> {
        if let Some(mask) = self.lookup(size) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return mask;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let mask = Arc::new(FalloffMask::generate(size));
        match self.entries.write() {
            // Another worker may have raced us here; keep whichever landed first.
            Ok(mut entries) => Arc::clone(entries.entry(size).or_insert(mask)),
            Err(_) => mask,
        }
    }

    pub fn stats(&self) -> FalloffCacheStats {
        FalloffCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().map(|m| m.len()).unwrap_or(0),
        }
    }

    fn lookup(&self, size: usize) -> Option<Arc<FalloffMask>> {
        self.entries
            .read()
            .ok()
            .and_then(|map| map.get(&size).cloned())
    }
}

impl Default for FalloffCache {
    fn default() -> Self {
        Self::new()
    }
}
