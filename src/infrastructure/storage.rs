//! Storage implementation for admission window state.
//!
//! Provides concurrent, sharded storage for per-source attempt windows.

use crate::application::ports::Storage;
use dashmap::DashMap;
use std::hash::Hash;

/// Thread-safe sharded storage backed by DashMap.
///
/// DashMap provides lock-free reads and fine-grained per-entry locking for
/// writes, so one source address's window update never blocks another's.
#[derive(Debug)]
pub struct ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    map: DashMap<K, V>,
}

impl<K, V> ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a new sharded storage instance.
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }
}

impl<K, V> Default for ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Storage<K, V> for ShardedStorage<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        let entry = self.map.entry(key);
        let mut value_ref = entry.or_insert_with(factory);
        accessor(&mut value_ref)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn clear(&self) {
        self.map.clear()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.map.retain(f);
    }
}

// Implement Storage for Arc<ShardedStorage> so shared handles can be used
// directly as the port.
impl<K, V> Storage<K, V> for std::sync::Arc<ShardedStorage<K, V>>
where
    K: Hash + Eq + Clone + Send + Sync + std::fmt::Debug,
    V: Send + Sync + std::fmt::Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_entry_mut(key, factory, accessor)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        (**self).retain(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_entry_mut_creates_and_updates() {
        let storage: ShardedStorage<&str, u32> = ShardedStorage::new();

        let value = storage.with_entry_mut("key", || 10, |v| {
            *v += 1;
            *v
        });
        assert_eq!(value, 11);

        // Existing entry is reused, not recreated.
        let value = storage.with_entry_mut("key", || 10, |v| {
            *v += 1;
            *v
        });
        assert_eq!(value, 12);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_retain() {
        let storage: ShardedStorage<&str, u32> = ShardedStorage::new();
        storage.with_entry_mut("keep", || 1, |_| ());
        storage.with_entry_mut("drop", || 100, |_| ());

        storage.retain(|_, v| *v < 50);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_clear() {
        let storage: ShardedStorage<&str, u32> = ShardedStorage::new();
        storage.with_entry_mut("a", || 1, |_| ());
        storage.with_entry_mut("b", || 2, |_| ());
        assert!(!storage.is_empty());

        storage.clear();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let storage: Arc<ShardedStorage<String, u64>> = Arc::new(ShardedStorage::new());
        let mut handles = vec![];

        for i in 0..10 {
            let storage = Arc::clone(&storage);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    storage.with_entry_mut(format!("key_{}_{}", i, j), || 0, |v| *v += 1);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(Storage::len(&storage), 1000);
    }

    #[test]
    fn test_concurrent_increments_on_one_key() {
        use std::sync::Arc;
        use std::thread;

        let storage: Arc<ShardedStorage<String, u64>> = Arc::new(ShardedStorage::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let storage = Arc::clone(&storage);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    storage.with_entry_mut("shared".to_string(), || 0, |v| *v += 1);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let total = storage.with_entry_mut("shared".to_string(), || 0, |v| *v);
        assert_eq!(total, 8000);
    }
}
