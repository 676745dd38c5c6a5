//! Bounded ordered container with FIFO/LRU eviction
//!
//! A `HashMap` maps keys to slots in an arena-backed doubly-linked list that
//! tracks eviction order: front = next victim, back = newest. Lookup,
//! insertion, promotion, and eviction are all O(1). No unsafe code; links
//! are `Vec` indices with a free list for recycled slots.

use crate::error::{CacheError, Result};
use crate::types::{CacheConfig, RecencyMode};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Null link marker for the arena list.
const NIL: usize = usize::MAX;

struct Node<K, V> {
    key: K,
    /// Always `Some` while the slot is linked; taken on eviction.
    value: Option<V>,
    prev: usize,
    next: usize,
}

/// An associative container that tracks insertion/access order and enforces
/// a capacity bound with deterministic front-of-order eviction.
///
/// Two invariants hold at all times: the key set of the lookup map equals
/// the key set of the linked order with no duplicates, and when the
/// configured capacity is non-negative, `len() <= capacity` after every
/// operation.
pub struct BoundedCache<K, V> {
    config: CacheConfig,
    map: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    /// Oldest entry, the next victim.
    head: usize,
    /// Newest entry.
    tail: usize,
    /// Head of the free-slot list, threaded through `next`.
    free: usize,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            map: HashMap::new(),
            nodes: Vec::new(),
            head: NIL,
            tail: NIL,
            free: NIL,
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    pub(crate) fn set_recency_mode(&mut self, mode: RecencyMode) {
        self.config.recency_mode = mode;
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether `key` is present. Never reorders.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Look up `key`, failing with `KeyNotFound` if absent.
    ///
    /// Under `Lru` the accessed entry is relinked at the newest position;
    /// under `Fifo` reads never change order.
    pub fn get(&mut self, key: &K) -> Result<&V> {
        let slot = *self.map.get(key).ok_or(CacheError::KeyNotFound)?;
        if self.config.recency_mode == RecencyMode::Lru {
            self.unlink(slot);
            self.push_back(slot);
        }
        // Linked slots always hold a value.
        match self.nodes[slot].value {
            Some(ref value) => Ok(value),
            None => Err(CacheError::KeyNotFound),
        }
    }

    /// Insert or overwrite `key`.
    ///
    /// An existing key has its value replaced; under `Lru` the overwrite
    /// also counts as a fresh use and relinks the entry at the newest
    /// position, while under `Fifo` the entry keeps its first-insertion
    /// position. A new key first evicts from the front while the cache is
    /// at capacity, so the bound holds after the insert completes. A
    /// capacity of zero stores nothing.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(&slot) = self.map.get(&key) {
            self.nodes[slot].value = Some(value);
            if self.config.recency_mode == RecencyMode::Lru {
                self.unlink(slot);
                self.push_back(slot);
            }
            return;
        }

        if let Some(cap) = self.config.bound() {
            if cap == 0 {
                while !self.is_empty() {
                    self.evict_front();
                }
                return;
            }
            while self.len() >= cap {
                self.evict_front();
            }
        }

        let slot = self.alloc(key.clone(), value);
        self.map.insert(key, slot);
        self.push_back(slot);
    }

    /// Set a new capacity, then evict from the front until the cache fits.
    ///
    /// Trims to exactly `new_capacity` entries; a negative capacity lifts
    /// the bound and evicts nothing. Resizing to zero while non-empty
    /// evicts everything immediately.
    pub fn resize(&mut self, new_capacity: i64) {
        self.config.capacity = new_capacity;
        if let Some(cap) = self.config.bound() {
            while self.len() > cap {
                self.evict_front();
            }
        }
    }

    /// Drop all entries, keeping the configuration.
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
    }

    /// Entries front-to-back, oldest (next victim) first.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            slot: self.head,
        }
    }

    /// Remove the structurally-oldest entry. No-op on an empty cache.
    fn evict_front(&mut self) {
        let slot = self.head;
        if slot == NIL {
            return;
        }
        self.unlink(slot);
        let key = self.nodes[slot].key.clone();
        self.map.remove(&key);
        self.nodes[slot].value = None;
        self.nodes[slot].next = self.free;
        self.free = slot;
        debug!(remaining = self.map.len(), "Evicted oldest cache entry");
    }

    /// Take a slot for a fresh entry, recycling the free list when possible.
    fn alloc(&mut self, key: K, value: V) -> usize {
        let node = Node {
            key,
            value: Some(value),
            prev: NIL,
            next: NIL,
        };
        if self.free == NIL {
            self.nodes.push(node);
            self.nodes.len() - 1
        } else {
            let slot = self.free;
            self.free = self.nodes[slot].next;
            self.nodes[slot] = node;
            slot
        }
    }

    fn unlink(&mut self, slot: usize) {
        let prev = self.nodes[slot].prev;
        let next = self.nodes[slot].next;
        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }
        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = NIL;
    }

    fn push_back(&mut self, slot: usize) {
        self.nodes[slot].prev = self.tail;
        self.nodes[slot].next = NIL;
        if self.tail == NIL {
            self.head = slot;
        } else {
            self.nodes[self.tail].next = slot;
        }
        self.tail = slot;
    }
}

/// Front-to-back iterator over cache entries in eviction order.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    slot: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.slot == NIL {
            return None;
        }
        let node = &self.nodes[self.slot];
        self.slot = node.next;
        node.value.as_ref().map(|value| (&node.key, value))
    }
}
