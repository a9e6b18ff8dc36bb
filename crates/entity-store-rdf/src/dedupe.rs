//! The value-node deduplication cache (spec §4.G), grounded on
//! `hashing/deduplication_cache.py`'s `HashDedupeBag`.
//!
//! Contract: false negatives (treating a previously-seen hash as new) are
//! acceptable — they just cost an extra emitted `wdv:` block — but false
//! positives (treating two different hashes as the same) are forbidden,
//! since that would silently merge two distinct RDF value nodes.

use std::collections::HashMap;

const DEFAULT_CUTOFF: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct DedupeStats {
    pub hits: u64,
    pub misses: u64,
    pub collisions: u64,
}

impl DedupeStats {
    #[must_use]
    pub fn size(&self) -> u64 {
        self.hits + self.misses
    }
}

/// A lossy, bounded-memory "have I seen this hash before" bag. Keys are
/// truncated to `cutoff` hex characters (optionally namespaced) to keep
/// memory flat across an arbitrarily large serialization run; a truncated
/// key collision is treated as a cache miss rather than a false hit.
#[derive(Debug, Default)]
pub struct HashDedupeBag {
    cutoff: usize,
    bag: HashMap<String, String>,
    stats: DedupeStats,
}

impl HashDedupeBag {
    #[must_use]
    pub fn new() -> Self {
        Self::with_cutoff(DEFAULT_CUTOFF)
    }

    #[must_use]
    pub fn with_cutoff(cutoff: usize) -> Self {
        Self {
            cutoff,
            bag: HashMap::new(),
            stats: DedupeStats::default(),
        }
    }

    /// Returns `true` iff `hash` (under `namespace`) was already recorded.
    /// Records it as seen on every call, whether a hit, a miss, or a
    /// truncated-key collision.
    pub fn already_seen(&mut self, hash: &str, namespace: &str) -> bool {
        let key = format!("{namespace}{}", &hash[..hash.len().min(self.cutoff)]);

        match self.bag.get(&key) {
            Some(stored) if stored == hash => {
                self.stats.hits += 1;
                true
            }
            Some(_) => {
                self.stats.collisions += 1;
                self.bag.insert(key, hash.to_owned());
                false
            }
            None => {
                self.stats.misses += 1;
                self.bag.insert(key, hash.to_owned());
                false
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> DedupeStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.bag.clear();
        self.stats = DedupeStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_hash_is_seen_on_second_call() {
        let mut bag = HashDedupeBag::new();
        assert!(!bag.already_seen("abcdef1234567890", ""));
        assert!(bag.already_seen("abcdef1234567890", ""));
        assert_eq!(bag.stats().hits, 1);
        assert_eq!(bag.stats().misses, 1);
    }

    #[test]
    fn truncated_key_collision_is_not_a_false_hit() {
        let mut bag = HashDedupeBag::with_cutoff(5);
        assert!(!bag.already_seen("abcde111111111", ""));
        // Same first 5 hex chars, different full hash: must NOT report seen.
        assert!(!bag.already_seen("abcde222222222", ""));
        assert_eq!(bag.stats().collisions, 1);
    }

    #[test]
    fn namespaces_are_independent() {
        let mut bag = HashDedupeBag::new();
        assert!(!bag.already_seen("abcdef1234567890", "value:"));
        assert!(!bag.already_seen("abcdef1234567890", "ref:"));
    }
}
