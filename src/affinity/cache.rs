//! Bounded client-identifier → session-cookie store.
//!
//! # Responsibilities
//! - Remember the last session cookie value issued to each client identifier
//! - Bound memory with least-recently-used eviction
//! - Serve concurrent request handlers
//!
//! # Design Decisions
//! - One mutex around an `lru::LruCache`; `get` mutates recency, so a read lock is not enough
//! - Constructed once at startup and shared via `Arc`
//! - No expiry: entries leave only under capacity pressure

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use thiserror::Error;

use crate::observability::metrics;

/// Errors raised while building the affinity layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AffinityError {
    /// Cache capacity must be at least one entry.
    #[error("invalid affinity cache capacity {0}: must be positive")]
    InvalidCapacity(usize),
}

/// Thread-safe LRU cache mapping client identifiers to session cookie values.
#[derive(Debug)]
pub struct AffinityCache {
    inner: Mutex<LruCache<String, String>>,
}

impl AffinityCache {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self, AffinityError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(AffinityError::InvalidCapacity(capacity))?;
        Ok(Self {
            inner: Mutex::new(LruCache::new(capacity)),
        })
    }

    /// Look up `key`, marking it most recently used.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key).cloned()
    }

    /// Insert or overwrite `key`, marking it most recently used.
    ///
    /// Returns the entry evicted to make room, if any.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) -> Option<(String, String)> {
        let key = key.into();
        let (evicted, len) = {
            let mut cache = self.inner.lock();
            // `push` also hands back the previous value of an overwritten key
            let evicted = cache.push(key.clone(), value.into()).filter(|(old, _)| *old != key);
            (evicted, cache.len())
        };

        if let Some((evicted_key, _)) = &evicted {
            tracing::debug!(client = %evicted_key, "Evicted least recently used affinity entry");
            metrics::record_cache_eviction();
        }
        metrics::record_cache_size(len);
        evicted
    }

    /// Look up `key` without touching recency.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.lock().peek(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }

    /// Copy of all entries, most recently used first.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.inner
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
