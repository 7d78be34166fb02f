//! In-memory cache of resolved bill queries.
//!
//! Entries are keyed by the fully resolved query parameters and expire after
//! a configurable TTL. The store is bounded; when full, the entry that has
//! been cached longest is evicted first.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;

use super::query::BillPage;

/// Cache key: one distinct combination of query parameters.
///
/// `search` is stored in its normalized (trimmed) form so that queries
/// differing only in surrounding whitespace share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
}

struct CacheEntry {
    page: BillPage,
    inserted_at: Instant,
}

/// Bounded TTL cache for [`BillPage`] results.
#[derive(Clone)]
pub struct QueryCache {
    capacity: usize,
    ttl: Duration,
    entries: Arc<RwLock<HashMap<QueryKey, CacheEntry>>>,
}

impl QueryCache {
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetch the cached page for this key if present and unexpired.
    pub async fn get(&self, key: &QueryKey) -> Option<BillPage> {
        let mut entries = self.entries.write().await;
        Self::prune_expired(self.ttl, &mut entries);
        entries.get(key).map(|entry| entry.page.clone())
    }

    /// Store a page, evicting the longest-cached entry when full.
    pub async fn insert(&self, key: QueryKey, page: BillPage) {
        let mut entries = self.entries.write().await;
        Self::prune_expired(self.ttl, &mut entries);

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                page,
                inserted_at: Instant::now(),
            },
        );
    }

    fn prune_expired(ttl: Duration, entries: &mut HashMap<QueryKey, CacheEntry>) {
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.inserted_at) <= ttl);
    }
}
