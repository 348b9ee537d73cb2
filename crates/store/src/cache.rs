// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded read cache for entity lookups.
//!
//! Least-recently-used over an insertion-ordered map: a hit re-inserts the
//! entry at the back, eviction pops the front. Keys are `(id, scope)` so a
//! global task and a same-named session task never collide.

use indexmap::IndexMap;

/// Cache key: entity id plus owning scope (None = global tree).
pub type CacheKey = (String, Option<String>);

#[derive(Debug)]
pub struct LruCache<V> {
    capacity: usize,
    map: IndexMap<CacheKey, V>,
}

impl<V: Clone> LruCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: IndexMap::new(),
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<V> {
        let value = self.map.shift_remove(key)?;
        self.map.insert(key.clone(), value.clone());
        Some(value)
    }

    pub fn put(&mut self, key: CacheKey, value: V) {
        self.map.shift_remove(&key);
        self.map.insert(key, value);
        while self.map.len() > self.capacity {
            self.map.shift_remove_index(0);
        }
    }

    /// Hit on id alone, whatever the scope (ids are globally unique).
    pub fn get_by_id(&mut self, id: &str) -> Option<V> {
        let key = self.map.keys().find(|(k, _)| k.as_str() == id)?.clone();
        self.get(&key)
    }

    pub fn invalidate(&mut self, key: &CacheKey) {
        self.map.shift_remove(key);
    }

    /// Drop every entry whose id matches, regardless of scope.
    pub fn invalidate_id(&mut self, id: &str) {
        self.map.retain(|(k, _), _| k != id);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
