use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;

struct Entry {
    text: String,
    inserted: Instant,
    last_used: u64,
}

/// In-memory link -> transcript memo with LRU eviction and optional expiry.
/// A capacity of zero disables caching.
pub struct TranscriptCache {
    entries: HashMap<String, Entry>,
    capacity: usize,
    ttl: Option<Duration>,
    clock: u64,
}

impl TranscriptCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            ttl,
            clock: 0,
        }
    }

    /// Look up a cached transcript by the raw link string
    pub fn get(&mut self, link: &str) -> Option<String> {
        let expired = self
            .entries
            .get(link)
            .is_some_and(|e| self.ttl.is_some_and(|ttl| e.inserted.elapsed() >= ttl));
        if expired {
            debug!("Cache entry expired: {link}");
            self.entries.remove(link);
            return None;
        }

        self.clock += 1;
        let clock = self.clock;
        let entry = self.entries.get_mut(link)?;
        entry.last_used = clock;
        debug!("Cache hit: {link}");
        Some(entry.text.clone())
    }

    pub fn insert(&mut self, link: String, text: String) {
        if self.capacity == 0 {
            return;
        }
        if !self.entries.contains_key(&link) && self.entries.len() >= self.capacity {
            self.evict_lru();
        }

        self.clock += 1;
        self.entries.insert(
            link,
            Entry {
                text,
                inserted: Instant::now(),
                last_used: self.clock,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            debug!("Cache full, evicting: {key}");
            self.entries.remove(&key);
        }
    }
}
