//! Bounded, process-lifetime in-memory store.
//!
//! Keeps at most `window_size` entries. Insertion order is tracked in a
//! queue; re-inserting a present key repositions it at the
//! most-recently-used end without triggering eviction. Eviction removes
//! strictly the oldest entry, one at a time, looping until the store is
//! back under the window. Readers share the lock; writers exclude.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::RwLock;

struct Inner<K, V> {
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

/// A windowed LRU-style keyed store.
pub struct WindowStore<K, V> {
    window_size: usize,
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> WindowStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a store holding at most `window_size` entries.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            inner: RwLock::new(Inner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.map.get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.map.contains_key(key)
    }

    /// Insert or refresh an entry.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.map.insert(key.clone(), value).is_some() {
            // Present key: reposition at the most-recently-used end.
            inner.order.retain(|k| k != &key);
            inner.order.push_back(key);
            return;
        }
        inner.order.push_back(key);
        while inner.map.len() > self.window_size {
            if let Some(oldest) = inner.order.pop_front() {
                inner.map.remove(&oldest);
            } else {
                break;
            }
        }
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let removed = inner.map.remove(key);
        if removed.is_some() {
            inner.order.retain(|k| k != key);
        }
        removed
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys from oldest to most recently used.
    pub fn keys(&self) -> Vec<K> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.order.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eviction_removes_strictly_the_oldest() {
        let store = WindowStore::new(3);
        store.put("a", 1);
        store.put("b", 2);
        store.put("c", 3);
        store.put("d", 4);

        assert_eq!(store.len(), 3);
        assert!(!store.contains(&"a"));
        assert!(store.contains(&"b"));
        assert!(store.contains(&"d"));
    }

    #[test]
    fn reinsert_repositions_without_eviction() {
        let store = WindowStore::new(3);
        store.put("a", 1);
        store.put("b", 2);
        store.put("c", 3);
        // Refresh "a": becomes most recently used, nothing evicted.
        store.put("a", 10);

        assert_eq!(store.len(), 3);
        assert_eq!(store.keys(), vec!["b", "c", "a"]);
        assert_eq!(store.get(&"a"), Some(10));

        // Next insert now evicts "b", the oldest.
        store.put("d", 4);
        assert!(!store.contains(&"b"));
        assert!(store.contains(&"a"));
    }

    #[test]
    fn window_of_n_keeps_most_recent_n() {
        let store = WindowStore::new(5);
        for i in 0..6 {
            store.put(i, i);
        }
        assert_eq!(store.len(), 5);
        assert!(!store.contains(&0));
        for i in 1..6 {
            assert!(store.contains(&i));
        }
    }
}
