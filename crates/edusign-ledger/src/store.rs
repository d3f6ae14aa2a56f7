//! Generic in-memory keyed store.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot` and is never held across `.await` points.
#[derive(Debug)]
pub struct Store<K, V> {
    data: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for Store<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Store<K, V> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a value, returning the previous value if the key existed.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.data.write().insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.data.read().contains_key(key)
    }

    /// Update a value in place. Returns the updated value, or `None` if absent.
    pub fn update(&self, key: &K, f: impl FnOnce(&mut V)) -> Option<V> {
        let mut guard = self.data.write();
        guard.get_mut(key).map(|entry| {
            f(entry);
            entry.clone()
        })
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for Store<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
