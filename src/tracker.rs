//! Change detection for telemetry.
//!
//! A value is only posted when it differs from what was last delivered.
//! Callers check, post, and then `commit`; a failed post is never committed,
//! so the same value goes out again on the next tick.

use std::collections::HashMap;
use std::hash::Hash;

/// The last value successfully delivered for one endpoint.
#[derive(Debug, Clone)]
pub struct LastSent<T> {
    value: Option<T>,
}

impl<T> Default for LastSent<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T: PartialEq + Clone> LastSent<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing was delivered yet or `current` differs.
    pub fn changed(&self, current: &T) -> bool {
        self.value.as_ref() != Some(current)
    }

    pub fn commit(&mut self, current: &T) {
        self.value = Some(current.clone());
    }

    pub fn reset(&mut self) {
        self.value = None;
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

/// Per-key cache, e.g. one entry per monster id.
#[derive(Debug, Clone)]
pub struct KeyedCache<K, V> {
    entries: HashMap<K, V>,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V: PartialEq + Clone> KeyedCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A key seen for the first time counts as changed.
    pub fn changed(&self, key: &K, current: &V) -> bool {
        self.entries.get(key) != Some(current)
    }

    pub fn commit(&mut self, key: K, current: V) {
        self.entries.insert(key, current);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop keys for which `keep` is false.
    pub fn retain<F: FnMut(&K) -> bool>(&mut self, mut keep: F) {
        self.entries.retain(|k, _| keep(k));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_sent_first_value_is_a_change() {
        let cache: LastSent<u32> = LastSent::new();
        assert!(cache.changed(&0));
    }

    #[test]
    fn test_last_sent_unchanged_after_commit() {
        let mut cache = LastSent::new();
        cache.commit(&5);
        assert!(!cache.changed(&5));
        assert!(cache.changed(&6));
        assert_eq!(cache.get(), Some(&5));
    }

    #[test]
    fn test_last_sent_uncommitted_value_stays_changed() {
        let cache = LastSent::new();
        // Check without commit simulates a failed post
        assert!(cache.changed(&"a"));
        assert!(cache.changed(&"a"));
    }

    #[test]
    fn test_last_sent_reset_forgets() {
        let mut cache = LastSent::new();
        cache.commit(&1);
        cache.reset();
        assert!(cache.changed(&1));
    }

    #[test]
    fn test_keyed_cache_tracks_each_key() {
        let mut cache = KeyedCache::new();
        assert!(cache.changed(&1, &"hp=10"));
        cache.commit(1, "hp=10");
        assert!(!cache.changed(&1, &"hp=10"));
        assert!(cache.changed(&1, &"hp=9"));
        assert!(cache.changed(&2, &"hp=10"));
    }

    #[test]
    fn test_keyed_cache_retain_and_reset() {
        let mut cache = KeyedCache::new();
        cache.commit(1, 'a');
        cache.commit(2, 'b');
        cache.retain(|k| *k != 1);
        assert!(!cache.contains(&1));
        assert_eq!(cache.len(), 1);
        cache.reset();
        assert!(cache.is_empty());
    }
}
