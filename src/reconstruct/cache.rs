//! Reconstruction cache
//!
//! Bounded LRU of reconstructed texts keyed by page and sequence number.
//!
//! Each entry is tagged with the content hash of the record it was built
//! from. A lookup must present the record's current hash and only hits on
//! an exact match; a stale entry is dropped on sight. The cache can
//! therefore never hand out text for a record it was not verified against.
//!
//! Entries are only inserted after successful verification. Capacity 0
//! disables the cache entirely.

use std::collections::HashMap;

use serde::Serialize;

use crate::hash::ContentHash;
use crate::version::{PageId, SequenceNumber};

type CacheKey = (PageId, SequenceNumber);

#[derive(Debug)]
struct CacheEntry {
    content_hash: ContentHash,
    content: String,
    last_used: u64,
}

/// Passive counters; they never influence caching decisions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because their hash no longer matched the record.
    pub stale: u64,
    pub evictions: u64,
}

/// LRU cache of verified reconstructions.
#[derive(Debug)]
pub struct ReconstructionCache {
    capacity: usize,
    entries: HashMap<CacheKey, CacheEntry>,
    clock: u64,
    stats: CacheStats,
}

impl ReconstructionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(1024)),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// A cache that stores nothing.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Look up the text of `sequence_number`, which must currently hash to
    /// `content_hash`.
    pub fn get(
        &mut self,
        page_id: PageId,
        sequence_number: SequenceNumber,
        content_hash: &ContentHash,
    ) -> Option<&str> {
        let key = (page_id, sequence_number);
        let fresh = match self.entries.get(&key) {
            Some(entry) => entry.content_hash == *content_hash,
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if !fresh {
            self.entries.remove(&key);
            self.stats.stale += 1;
            self.stats.misses += 1;
            return None;
        }

        self.clock += 1;
        let clock = self.clock;
        self.stats.hits += 1;
        self.entries.get_mut(&key).map(|entry| {
            entry.last_used = clock;
            entry.content.as_str()
        })
    }

    /// Store verified text for `sequence_number`.
    pub fn insert(
        &mut self,
        page_id: PageId,
        sequence_number: SequenceNumber,
        content_hash: ContentHash,
        content: String,
    ) {
        if self.capacity == 0 {
            return;
        }
        let key = (page_id, sequence_number);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_least_recent();
        }
        self.clock += 1;
        self.entries.insert(
            key,
            CacheEntry {
                content_hash,
                content,
                last_used: self.clock,
            },
        );
    }

    /// Drop every entry of one page.
    pub fn invalidate_page(&mut self, page_id: PageId) {
        self.entries.retain(|(page, _), _| *page != page_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.evictions += 1;
        }
    }
}

impl Default for ReconstructionCache {
    fn default() -> Self {
        Self::disabled()
    }
}
