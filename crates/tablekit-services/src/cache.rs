//! Query result cache

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::request::RequestKey;
use crate::transport::QueryResult;

/// How long a result is served without revalidation
pub const DEFAULT_STALE_TIME: Duration = Duration::ZERO;
/// How long an unused result is kept at all
pub const DEFAULT_CACHE_RETENTION: Duration = Duration::from_secs(300);

struct CacheEntry {
    result: Arc<QueryResult>,
    generation: u64,
    cached_at: Instant,
}

/// A cache hit
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub result: Arc<QueryResult>,
    pub generation: u64,
    /// Younger than the stale time; no revalidation needed
    pub is_fresh: bool,
}

/// Results keyed by request key
pub struct QueryCache {
    entries: RwLock<HashMap<RequestKey, CacheEntry>>,
    stale_time: Duration,
    retention: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME, DEFAULT_CACHE_RETENTION)
    }
}

impl QueryCache {
    pub fn new(stale_time: Duration, retention: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stale_time,
            retention,
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    pub fn get(&self, key: &RequestKey) -> Option<CachedResult> {
        let age = {
            let entries = self.entries.read();
            let entry = entries.get(key)?;
            let age = entry.cached_at.elapsed();
            if age < self.retention {
                return Some(CachedResult {
                    result: entry.result.clone(),
                    generation: entry.generation,
                    is_fresh: age < self.stale_time,
                });
            }
            age
        };

        tracing::trace!(table = %key.table, ?age, "evicting expired result");
        self.entries.write().remove(key);
        None
    }

    /// Store a result unless a newer generation is already cached.
    /// Expired entries of other keys are dropped on the way.
    pub fn insert(&self, key: RequestKey, result: Arc<QueryResult>, generation: u64) {
        let retention = self.retention;
        let mut entries = self.entries.write();
        entries.retain(|_, entry| entry.cached_at.elapsed() < retention);
        if let Some(existing) = entries.get(&key) {
            if existing.generation > generation {
                return;
            }
        }
        entries.insert(
            key,
            CacheEntry {
                result,
                generation,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop every entry of a table, returning how many were removed
    pub fn invalidate_table(&self, table: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.table != table);
        before - entries.len()
    }

    /// Drop entries past the retention period
    pub fn prune(&self) {
        let retention = self.retention;
        self.entries
            .write()
            .retain(|_, entry| entry.cached_at.elapsed() < retention);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
