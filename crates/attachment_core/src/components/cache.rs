//! Ephemeral in-memory cache pool handed out under the `cache` key.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheItem {
    value: Value,
    expires_at: Option<Instant>,
}

impl CacheItem {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Process-local key/value pool. Expired items are dropped on read.
#[derive(Debug, Default)]
pub struct CachePool {
    items: RefCell<HashMap<String, CacheItem>>,
}

impl CachePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let mut items = self.items.borrow_mut();
        let now = Instant::now();
        if items.get(key).is_some_and(|item| item.is_expired(now)) {
            items.remove(key);
            return None;
        }
        items.get(key).map(|item| item.value.clone())
    }

    /// Stores a value. `ttl = None`, or a TTL past the clock's range, keeps
    /// it until deleted or cleared.
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.items
            .borrow_mut()
            .insert(key.into(), CacheItem { value, expires_at });
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn delete(&self, key: &str) -> bool {
        self.items.borrow_mut().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    /// Counts stored items, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}
