//! Map wrapper that never creates entries implicitly.
//!
//! Registry tables are keyed by handles that come from the host stack and,
//! on the receive path, indirectly from the wire. A lookup of an unknown
//! handle must answer "not found", never materialise a default entry that
//! later looks like a registered interface.
//!
//! `SyncMap` only creates entries through `insert()` and the explicit
//! `get_or_insert_with()`.

use std::collections::HashMap;
use std::hash::Hash;

/// A map wrapper that prevents implicit entry creation.
///
/// # Example
///
/// ```
/// use dsa_core::SyncMap;
///
/// let mut map: SyncMap<u32, &str> = SyncMap::new();
/// assert!(map.get(&1).is_none());
/// assert!(map.is_empty());
///
/// map.insert(1, "eth0");
/// assert_eq!(map.get(&1), Some(&"eth0"));
/// ```
#[derive(Debug, Clone)]
pub struct SyncMap<K, V> {
    inner: HashMap<K, V>,
}

impl<K, V> SyncMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates a new empty map.
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns true if the map contains the given key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns a reference to the value for the given key.
    ///
    /// **This never creates entries.**
    pub fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    /// Returns a mutable reference to the value for the given key.
    ///
    /// **This never creates entries.**
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    /// Inserts a key-value pair, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    /// Returns an iterator over key-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner.iter()
    }

    /// Returns an iterator over values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.values()
    }

    /// Gets the value for a key, or inserts one built by `f`.
    ///
    /// Unlike `get()`, this **will** create an entry. Use it only where
    /// creation is the intent (registering an interface context).
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.inner.entry(key).or_insert_with(f)
    }
}

impl<K, V> Default for SyncMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
