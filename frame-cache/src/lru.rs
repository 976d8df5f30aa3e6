//! Bounded map with least-recently-used eviction
//!
//! Keys are 64-bit content hashes. Recency is tracked with a doubly linked
//! list threaded through the map entries, so `put`, `get` and `has` are all
//! amortized O(1).

use std::collections::HashMap;

struct Entry<V> {
    value: V,
    /// Neighbor toward the most-recently-used end.
    prev: Option<u64>,
    /// Neighbor toward the least-recently-used end.
    next: Option<u64>,
}

/// A bounded hash-keyed cache with recency eviction.
///
/// Capacity is fixed at construction. Inserting into a full cache evicts the
/// least-recently-used key; `put` and `get` both move the touched key to the
/// most-recently-used position, `has` and `peek` do not.
pub struct LruCache<V> {
    capacity: usize,
    map: HashMap<u64, Entry<V>>,
    /// Most-recently-used key.
    head: Option<u64>,
    /// Least-recently-used key.
    tail: Option<u64>,
}

impl<V> LruCache<V> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            map: HashMap::with_capacity(capacity.min(1024)),
            head: None,
            tail: None,
        }
    }

    /// Insert or update a value, making its key the most recently used.
    ///
    /// If the cache is full and the key is new, the least-recently-used entry
    /// is evicted first. A zero-capacity cache stores nothing.
    pub fn put(&mut self, key: u64, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some(entry) = self.map.get_mut(&key) {
            entry.value = value;
            self.bump(key);
            return;
        }

        if self.map.len() == self.capacity {
            if let Some(evicted) = self.tail {
                self.detach(evicted);
                self.map.remove(&evicted);
                tracing::trace!(key = evicted, "evicting least-recently-used entry");
            }
        }

        self.map.insert(
            key,
            Entry {
                value,
                prev: None,
                next: self.head,
            },
        );
        self.attach_front(key);
    }

    /// Whether `key` is cached. Does not touch recency order.
    pub fn has(&self, key: u64) -> bool {
        self.map.contains_key(&key)
    }

    /// Look up a value, moving its key to the most-recently-used position.
    pub fn get(&mut self, key: u64) -> Option<&V> {
        if self.map.contains_key(&key) {
            self.bump(key);
        }
        self.map.get(&key).map(|entry| &entry.value)
    }

    /// Look up a value without touching recency order.
    pub fn peek(&self, key: u64) -> Option<&V> {
        self.map.get(&key).map(|entry| &entry.value)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The construction-time capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.head = None;
        self.tail = None;
    }

    /// Cached keys from most to least recently used.
    pub fn keys_mru_first(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::successors(self.head, |key| self.map.get(key).and_then(|e| e.next))
    }

    /// Unlink `key` from the recency list. The entry stays in the map.
    fn detach(&mut self, key: u64) {
        let (prev, next) = {
            let entry = &self.map[&key];
            (entry.prev, entry.next)
        };

        match prev {
            Some(p) => {
                if let Some(entry) = self.map.get_mut(&p) {
                    entry.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(entry) = self.map.get_mut(&n) {
                    entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    /// Link an already-inserted `key` at the most-recently-used end.
    fn attach_front(&mut self, key: u64) {
        if let Some(old_head) = self.head {
            if let Some(entry) = self.map.get_mut(&old_head) {
                entry.prev = Some(key);
            }
        }
        if let Some(entry) = self.map.get_mut(&key) {
            entry.prev = None;
            entry.next = self.head;
        }
        self.head = Some(key);
        if self.tail.is_none() {
            self.tail = Some(key);
        }
    }

    /// Move an existing `key` to the most-recently-used position.
    fn bump(&mut self, key: u64) {
        if self.head == Some(key) {
            return;
        }
        self.detach(key);
        self.attach_front(key);
    }
}
