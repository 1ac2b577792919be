//! Cache of extracted document texts

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Extracted text remembered for follow-up calls
#[derive(Debug, Clone, PartialEq)]
pub struct CachedText {
    /// Display name of the source the text was extracted from
    pub source: String,
    pub text: String,
}

impl CachedText {
    /// Bytes charged against the cache budget
    fn size(&self) -> usize {
        self.source.len() + self.text.len()
    }
}

struct Entries {
    lru: LruCache<String, CachedText>,
    used_bytes: usize,
}

/// LRU store of document texts bounded by entry count and total bytes.
///
/// Keys are random UUIDs handed out by [`CacheManager::insert`].
pub struct CacheManager {
    entries: Mutex<Entries>,
    max_bytes: usize,
}

impl CacheManager {
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(Entries {
                lru: LruCache::new(capacity),
                used_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Store `text` under a fresh key and return the key.
    ///
    /// Returns `None` when the entry alone is larger than the byte budget.
    /// Least recently used entries are dropped until the new one fits.
    pub fn insert(&self, source: &str, text: String) -> Option<String> {
        let entry = CachedText {
            source: source.to_string(),
            text,
        };
        let size = entry.size();
        if size > self.max_bytes {
            return None;
        }

        let mut entries = self.entries.lock();
        while entries.used_bytes + size > self.max_bytes {
            let Some((_, evicted)) = entries.lru.pop_lru() else {
                break;
            };
            entries.used_bytes = entries.used_bytes.saturating_sub(evicted.size());
        }

        let key = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if !entries.lru.contains(&candidate) {
                break candidate;
            }
        };

        // At capacity, push hands back the entry it displaced
        if let Some((_, displaced)) = entries.lru.push(key.clone(), entry) {
            entries.used_bytes = entries.used_bytes.saturating_sub(displaced.size());
        }
        entries.used_bytes += size;

        Some(key)
    }

    /// Look up a cached text, marking it as recently used
    pub fn get(&self, key: &str) -> Option<CachedText> {
        self.entries.lock().lru.get(key).cloned()
    }
}
