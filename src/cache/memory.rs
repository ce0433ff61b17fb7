//! Memory tier: an LRU map bounded by total decoded bytes rather than entry count.

use super::bitmap::DecodedImage;
use super::key::CacheKey;
use lru::LruCache;
use std::sync::{Arc, Mutex};
use tracing::debug;

struct Inner {
    entries: LruCache<CacheKey, Arc<DecodedImage>>,
    total_bytes: usize,
}

/// Byte-bounded LRU of decoded images, safe to share between threads.
pub struct MemoryTier {
    inner: Mutex<Inner>,
    budget_bytes: usize,
}

impl MemoryTier {
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::unbounded(),
                total_bytes: 0,
            }),
            budget_bytes,
        }
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    /// Returns the image and marks it most recently used.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<DecodedImage>> {
        let mut inner = self.inner.lock().ok()?;
        inner.entries.get(key).cloned()
    }

    /// Inserts or replaces `key`, evicting least recently used entries until the total
    /// fits the budget. An image larger than the whole budget is not kept.
    pub fn insert(&self, key: CacheKey, image: Arc<DecodedImage>) {
        let size = image.byte_size();
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        if let Some(previous) = inner.entries.pop(&key) {
            inner.total_bytes -= previous.byte_size();
        }

        if size > self.budget_bytes {
            debug!(key = %key, size, "Image exceeds memory budget, not kept in memory");
            return;
        }

        while inner.total_bytes + size > self.budget_bytes {
            match inner.entries.pop_lru() {
                Some((evicted, image)) => {
                    inner.total_bytes -= image.byte_size();
                    debug!(key = %evicted, "Evicted from memory tier");
                }
                None => break,
            }
        }

        inner.entries.put(key, image);
        inner.total_bytes += size;
    }

    pub fn remove(&self, key: &CacheKey) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(image) = inner.entries.pop(key) {
                inner.total_bytes -= image.byte_size();
            }
        }
    }

    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.clear();
            inner.total_bytes = 0;
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.entries.contains(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summed decoded size of the images currently held.
    pub fn used_bytes(&self) -> usize {
        self.inner.lock().map(|inner| inner.total_bytes).unwrap_or(0)
    }
}
