//! Insertion-ordered multimap used for every grouping step.
//!
//! Keys keep the order in which they were first pushed; values under a key
//! keep arrival order. Rendering output depends on both, so the ordering is
//! part of this type's contract rather than an accident of the backing map.

use std::collections::HashMap;
use std::hash::Hash;

/// Multimap with first-seen key order and append-only value sequences.
#[derive(Debug, Clone)]
pub struct OrderedMultiMap<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, Vec<V>)>,
}

impl<K, V> Default for OrderedMultiMap<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V> OrderedMultiMap<K, V> {
    /// Create an empty multimap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key`, registering the key on first sight.
    pub fn push(&mut self, key: K, value: V) {
        if let Some(&slot) = self.index.get(&key) {
            self.entries[slot].1.push(value);
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, vec![value]));
        }
    }

    /// Values stored under `key`, in arrival order.
    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.index
            .get(key)
            .map(|&slot| self.entries[slot].1.as_slice())
    }
}

impl<K, V> OrderedMultiMap<K, V> {
    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// `(key, values)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key has been pushed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> IntoIterator for OrderedMultiMap<K, V> {
    type Item = (K, Vec<V>);
    type IntoIter = std::vec::IntoIter<(K, Vec<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Hash + Eq + Clone, V> FromIterator<(K, V)> for OrderedMultiMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.push(k, v);
        }
        map
    }
}
