use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::geocode::Location;

/// Concurrent key/value store whose entries expire.
///
/// With a fixed expiry an entry lives `ttl` from insertion. With a sliding
/// expiry every read pushes the deadline out by `ttl` again, so only idle
/// entries age out.
pub struct TtlCache<K, V> {
    entries: DashMap<K, Slot<V>>,
    ttl: Duration,
    sliding: bool,
}

struct Slot<V> {
    value: V,
    deadline: Instant,
}

impl<V> Slot<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.deadline > now
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            sliding: false,
        }
    }

    pub fn sliding(ttl: Duration) -> Self {
        Self {
            sliding: true,
            ..Self::new(ttl)
        }
    }

    /// Live value for `key`. Expired entries are evicted on the way.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut slot = self.entries.get_mut(key)?;
        if !slot.is_live(now) {
            drop(slot);
            self.entries.remove_if(key, |_, slot| !slot.is_live(now));
            return None;
        }
        if self.sliding {
            slot.deadline = now + self.ttl;
        }
        Some(slot.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let slot = Slot {
            value,
            deadline: Instant::now() + self.ttl,
        };
        self.entries.insert(key, slot);
    }

    /// Remove `key`, returning its value if it was still live
    pub fn remove(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.entries
            .remove(key)
            .filter(|(_, slot)| slot.is_live(now))
            .map(|(_, slot)| slot.value)
    }

    /// Drop every expired entry; returns how many went
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, slot| slot.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Entry count, expired ones included until the next sweep
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolved places keyed by normalized query text
pub type GeoCache = Arc<TtlCache<String, Location>>;

pub fn create_geo_cache(ttl: Duration) -> GeoCache {
    Arc::new(TtlCache::new(ttl))
}

/// Lowercase, trimmed, inner whitespace collapsed
pub fn normalize_cache_key(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Sweep expired entries of `cache` once per `every`
pub fn start_cache_cleanup_task<K, V>(
    cache: Arc<TtlCache<K, V>>,
    every: Duration,
    name: &'static str,
) where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if cache.is_empty() {
                continue;
            }
            let removed = cache.cleanup();
            if removed > 0 {
                tracing::debug!(
                    cache = name,
                    removed,
                    remaining = cache.len(),
                    "Expired entries swept"
                );
            }
        }
    });
}
