use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

struct Inner<K, V> {
    entries: HashMap<K, V>,
    /// Recency order: front = least recently used, back = most recently used.
    order: VecDeque<K>,
}

/// Capacity-bounded cache with strict least-recently-used eviction.
///
/// `get` on a hit promotes the key to most-recently-used. `put` of a new key
/// at capacity evicts exactly one entry, the least-recently-used one, before
/// inserting; `put` of an existing key updates value and recency without
/// evicting. Entries have no TTL and stay valid until pushed out by
/// capacity pressure.
///
/// One mutex serializes all map and recency-order mutation so concurrent
/// `get`/`put` pairs cannot corrupt the bookkeeping.
pub struct LruCache<K, V> {
    capacity: usize,
    inner: Mutex<Inner<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + std::hash::Hash,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a key, marking it most-recently-used on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(value) = inner.entries.get(key).cloned() {
            inner.order.retain(|k| k != key);
            inner.order.push_back(key.clone());
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(value)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Insert or update an entry. Returns the evicted key, if the insert
    /// pushed one out.
    pub fn put(&self, key: K, value: V) -> Option<K> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if inner.entries.contains_key(&key) {
            inner.entries.insert(key.clone(), value);
            inner.order.retain(|k| k != &key);
            inner.order.push_back(key);
            return None;
        }

        let mut evicted = None;
        if inner.entries.len() >= self.capacity {
            if let Some(lru_key) = inner.order.pop_front() {
                inner.entries.remove(&lru_key);
                debug!("evicted least-recently-used cache entry");
                evicted = Some(lru_key);
            }
        }

        inner.entries.insert(key.clone(), value);
        inner.order.push_back(key);
        evicted
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
