//! Sharded bounded LRU cache shared by the three engine cache layers

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::num::NonZeroUsize;

use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;

/// Statistics about cache performance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
    /// Number of entries evicted to make room
    pub evictions: usize,
    /// Current number of entries
    pub entries: usize,
    /// Configured capacity
    pub capacity: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded map with least-recently-used eviction
///
/// Keys are spread over independently locked shards, each an
/// [`LruCache`] holding an even share of the capacity. Eviction order is
/// exact LRU within a shard; with a single shard it is exact LRU overall.
///
/// No lock is held while a missing value is computed, so two callers
/// racing on the same key may both compute it and the last insert wins.
pub struct BoundedCache<K, V> {
    shards: Box<[Mutex<LruCache<K, V>>]>,
    hasher: RandomState,
    capacity: usize,
    stats: DashMap<&'static str, usize>,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    /// Creates a cache holding at most `capacity` entries over `shards` shards
    ///
    /// Zero values are raised to one; shard count never exceeds capacity.
    /// Capacity is split so shard sizes differ by at most one and sum to
    /// `capacity`.
    pub fn new(capacity: usize, shards: usize) -> Self {
        let capacity = capacity.max(1);
        let shard_count = shards.clamp(1, capacity);
        let base = capacity / shard_count;
        let remainder = capacity % shard_count;

        let shards = (0..shard_count)
            .map(|i| {
                let size = if i < remainder { base + 1 } else { base };
                Mutex::new(LruCache::new(NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN)))
            })
            .collect();

        Self {
            shards,
            hasher: RandomState::new(),
            capacity,
            stats: DashMap::new(),
        }
    }

    fn shard(&self, key: &K) -> &Mutex<LruCache<K, V>> {
        let idx = (self.hasher.hash_one(key) % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    /// Gets a value, marking it most recently used
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.shard(key).lock().get(key).cloned();
        self.increment_stat(if value.is_some() { "hits" } else { "misses" });
        value
    }

    /// Inserts a value, evicting the least recently used entry of the
    /// shard when full
    pub fn insert(&self, key: K, value: V) {
        let mut shard = self.shard(&key).lock();
        let evicting = !shard.contains(&key) && shard.len() == shard.cap().get();
        shard.put(key, value);
        drop(shard);

        if evicting {
            self.increment_stat("evictions");
        }
    }

    /// Gets a value or computes and caches it
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }

        let value = f();
        self.insert(key, value.clone());
        value
    }

    /// Gets a value or computes it, caching only successful results
    pub fn try_get_or_insert_with<F, E>(&self, key: K, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = f()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Whether the key is cached, without touching its recency
    pub fn contains(&self, key: &K) -> bool {
        self.shard(key).lock().contains(key)
    }

    /// Removes every entry and resets statistics
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
        self.stats.clear();
    }

    /// Current number of entries over all shards
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            evictions: self.get_stat("evictions"),
            entries: self.len(),
            capacity: self.capacity,
        }
    }

    fn increment_stat(&self, key: &'static str) {
        self.stats
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &'static str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_insert() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(10, 4);
        assert!(cache.get(&"a".to_string()).is_none());

        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_lru_eviction_single_shard() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(2, 1);
        cache.insert(1, 10);
        cache.insert(2, 20);

        // Touch 1 so 2 becomes least recently used
        assert_eq!(cache.get(&1), Some(10));
        cache.insert(3, 30);

        assert!(cache.contains(&1));
        assert!(!cache.contains(&2));
        assert!(cache.contains(&3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_replace_is_not_eviction() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(1, 1);
        cache.insert(1, 10);
        cache.insert(1, 11);
        assert_eq!(cache.get(&1), Some(11));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_bounded() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(8, 4);
        for i in 0..100 {
            cache.insert(i, i);
        }
        assert!(cache.len() <= 8);
        assert_eq!(cache.stats().evictions + cache.len(), 100);
    }

    #[test]
    fn test_uneven_split_never_exceeds_capacity() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(10, 4);
        let shard_caps: Vec<usize> = cache.shards.iter().map(|s| s.lock().cap().get()).collect();
        assert_eq!(shard_caps, vec![3, 3, 2, 2]);

        for i in 0..1000 {
            cache.insert(i, i);
        }
        assert!(cache.len() <= 10);
        assert_eq!(cache.stats().evictions + cache.len(), 1000);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(0, 0);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.shard_count(), 1);
        cache.insert(1, 1);
        assert_eq!(cache.get(&1), Some(1));
    }

    #[test]
    fn test_shards_clamped_to_capacity() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(3, 16);
        assert_eq!(cache.shard_count(), 3);
    }

    #[test]
    fn test_get_or_insert_with() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(4, 1);
        assert_eq!(cache.get_or_insert_with(1, || 10), 10);
        assert_eq!(cache.get_or_insert_with(1, || panic!("should hit")), 10);
    }

    #[test]
    fn test_try_get_or_insert_with_skips_errors() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(4, 1);
        let result: Result<u32, &str> = cache.try_get_or_insert_with(1, || Err("bad"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(4, 2);
        cache.insert(1, 1);
        cache.get(&1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats { capacity: 4, ..Default::default() });
    }

    #[test]
    fn test_concurrent_access() {
        let cache: Arc<BoundedCache<u32, u32>> = Arc::new(BoundedCache::new(64, 8));
        let mut handles = vec![];

        for t in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    let key = (t * 100 + i) % 50;
                    assert_eq!(cache.get_or_insert_with(key, || key * 2), key * 2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 800);
        assert!(cache.len() <= 64);
    }
}
