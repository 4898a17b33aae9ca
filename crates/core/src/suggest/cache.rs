//! Bounded cache of remote suggestion results keyed by sentence fingerprint.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vocabulary::Word;

/// Cache key: the sentence's word ids joined with `_`.
///
/// Ids are not escaped, so any two id sequences that join to the same string
/// share a key: `["me_gusta"]` and `["me", "gusta"]` both map to `me_gusta`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(sentence: &[Word]) -> Self {
        Self(
            sentence
                .iter()
                .map(|w| w.id.as_str())
                .collect::<Vec<_>>()
                .join("_"),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insertion-ordered cache. At capacity the oldest inserted entry is evicted;
/// reads do not refresh an entry's age.
#[derive(Debug)]
pub struct SuggestionCache {
    capacity: usize,
    entries: HashMap<Fingerprint, Vec<Word>>,
    order: VecDeque<Fingerprint>,
}

impl SuggestionCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &Fingerprint) -> Option<&[Word]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Store a non-empty result. Empty results are never cached.
    ///
    /// Re-inserting an existing key replaces its value and keeps its
    /// original position in the eviction order.
    pub fn put(&mut self, key: Fingerprint, words: Vec<Word>) {
        if words.is_empty() {
            return;
        }

        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = words;
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, words);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
