use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub disposed: u64,
    pub entries: u32,
}

/// Keyed cache for loaded resources (surfaces, textures, materials) owned by
/// whoever renders with them. Entries live until disposed explicitly.
pub struct ResourceCache<K, V> {
    entries: HashMap<K, V>,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: u64,
    disposed: u64,
}

impl<K: Eq + Hash, V> Default for ResourceCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> ResourceCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: 0,
            disposed: 0,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let entry = self.entries.get(key);
        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        entry
    }

    /// Returns the cached entry or runs `load` once to fill it. A failed load
    /// leaves the cache untouched.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, load: F) -> Result<&V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let value = load()?;
                self.loads += 1;
                Ok(entry.insert(value))
            }
        }
    }

    pub fn dispose(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.disposed += 1;
        }
        removed
    }

    /// Drops every entry; returns how many were released.
    pub fn dispose_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.disposed += count as u64;
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats_snapshot(&self) -> ResourceCacheStats {
        ResourceCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads,
            disposed: self.disposed,
            entries: self.entries.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_once_per_key() {
        let mut cache: ResourceCache<String, Vec<u8>> = ResourceCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with("ground.obj".to_string(), || {
                    calls += 1;
                    Ok::<_, String>(vec![1, 2, 3])
                })
                .expect("load");
            assert_eq!(value.len(), 3);
        }
        assert_eq!(calls, 1);
        let stats = cache.stats_snapshot();
        assert_eq!(stats.loads, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut cache: ResourceCache<&str, u32> = ResourceCache::new();
        let err = cache
            .get_or_try_insert_with("broken", || Err("bad file"))
            .expect_err("load fails");
        assert_eq!(err, "bad file");
        assert!(cache.is_empty());
        let value = cache
            .get_or_try_insert_with("broken", || Ok::<_, &str>(7))
            .expect("retry");
        assert_eq!(*value, 7);
    }

    #[test]
    fn explicit_disposal() {
        let mut cache: ResourceCache<u32, &str> = ResourceCache::new();
        for key in 0..4 {
            cache
                .get_or_try_insert_with(key, || Ok::<_, ()>("texture"))
                .expect("insert");
        }
        assert_eq!(cache.dispose(&1), Some("texture"));
        assert_eq!(cache.dispose(&1), None);
        assert!(cache.get(&1).is_none());
        assert!(cache.get(&2).is_some());
        assert_eq!(cache.dispose_all(), 3);
        assert!(cache.is_empty());
        assert_eq!(cache.stats_snapshot().disposed, 4);
    }
}
