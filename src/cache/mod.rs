//! Ephemeral Cache: avoids redundant remote calls for identical requests.
//!
//! Keys are derived from the canonical JSON of the request shape, hashed
//! with SHA-256. Each namespace gets its own LRU ring so writers never
//! contend across namespaces; a maintenance pass evicts expired entries
//! first, then the least-recently-used ones down to a target size.

use lru::LruCache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

/// Inputs hashed into a cache key. `temperature` is bucketed to 0.1
/// before hashing so float noise does not fragment the cache.
#[derive(Debug, Clone, Serialize)]
struct CacheKeyInput<'a> {
    namespace: &'a str,
    model_id: &'a str,
    system_prompt: &'a str,
    user_content: &'a str,
    temperature_bucket: i64,
    max_tokens: usize,
}

/// Buckets `temperature` to the nearest 0.1 and represents it as an
/// integer (tenths) so it hashes identically regardless of float
/// representation noise.
fn bucket_temperature(temperature: f32) -> i64 {
    (temperature * 10.0).round() as i64
}

/// Derives the SHA-256 hex digest cache key for a request shape.
pub fn derive_key(
    namespace: &str,
    model_id: &str,
    system_prompt: &str,
    user_content: &str,
    temperature: f32,
    max_tokens: usize,
) -> String {
    let input = CacheKeyInput {
        namespace,
        model_id,
        system_prompt,
        user_content,
        temperature_bucket: bucket_temperature(temperature),
        max_tokens,
    };
    // Struct field order is stable at compile time, giving a canonical
    // JSON encoding without a separate normalization pass.
    let canonical = serde_json::to_vec(&input).expect("cache key input always serializes");
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    inserted_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// Point-in-time counters for one namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
}

struct Namespace {
    entries: Mutex<LruCache<String, Entry>>,
}

impl Namespace {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap()),
            )),
        }
    }
}

/// Content-addressed, TTL-bounded cache keyed per namespace.
pub struct EphemeralCache {
    namespaces: RwLock<HashMap<String, Namespace>>,
    default_capacity: usize,
}

impl EphemeralCache {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            default_capacity,
        }
    }

    fn with_namespace<R>(&self, namespace: &str, f: impl FnOnce(&Namespace) -> R) -> R {
        {
            let read = self.namespaces.read().expect("namespaces lock poisoned");
            if let Some(ns) = read.get(namespace) {
                return f(ns);
            }
        }
        let mut write = self.namespaces.write().expect("namespaces lock poisoned");
        let ns = write
            .entry(namespace.to_string())
            .or_insert_with(|| Namespace::new(self.default_capacity));
        f(ns)
    }

    /// Returns the cached value for `key` in `namespace`, or `None` if
    /// absent or expired. An expired hit is evicted on the way out.
    pub fn get(&self, namespace: &str, key: &str) -> Option<serde_json::Value> {
        self.with_namespace(namespace, |ns| {
            let mut entries = ns.entries.lock().expect("entries lock poisoned");
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
                Some(_) => {
                    entries.pop(key);
                    None
                }
                None => None,
            }
        })
    }

    /// Inserts `value` under `key` with the given TTL. Writes to a given
    /// namespace's ring are serialized by that namespace's mutex, so a
    /// `put` is never observed half-written by a concurrent `get`.
    pub fn put(&self, namespace: &str, key: &str, value: serde_json::Value, ttl: Duration) {
        self.with_namespace(namespace, |ns| {
            let mut entries = ns.entries.lock().expect("entries lock poisoned");
            entries.put(
                key.to_string(),
                Entry {
                    value,
                    inserted_at: Instant::now(),
                    ttl,
                },
            );
        });
    }

    /// Reports size/capacity for one namespace, or the sum across all
    /// namespaces when `namespace` is `None`.
    pub fn stats(&self, namespace: Option<&str>) -> CacheStats {
        let read = self.namespaces.read().expect("namespaces lock poisoned");
        match namespace {
            Some(ns_name) => read
                .get(ns_name)
                .map(|ns| {
                    let entries = ns.entries.lock().expect("entries lock poisoned");
                    CacheStats {
                        size: entries.len(),
                        capacity: entries.cap().get(),
                    }
                })
                .unwrap_or_default(),
            None => read.values().fold(CacheStats::default(), |acc, ns| {
                let entries = ns.entries.lock().expect("entries lock poisoned");
                CacheStats {
                    size: acc.size + entries.len(),
                    capacity: acc.capacity + entries.cap().get(),
                }
            }),
        }
    }

    /// Evicts expired entries from every namespace, then evicts
    /// least-recently-used entries until each namespace is at or under
    /// its target capacity. Returns the total number of entries removed.
    pub fn maintenance(&self) -> usize {
        let read = self.namespaces.read().expect("namespaces lock poisoned");
        let mut removed = 0;
        for ns in read.values() {
            let mut entries = ns.entries.lock().expect("entries lock poisoned");
            let expired_keys: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| entry.is_expired())
                .map(|(k, _)| k.clone())
                .collect();
            for key in expired_keys {
                entries.pop(&key);
                removed += 1;
            }
            let target = entries.cap().get();
            while entries.len() > target {
                if entries.pop_lru().is_some() {
                    removed += 1;
                } else {
                    break;
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation_is_stable_and_sensitive() {
        let k1 = derive_key("ns", "gpt-4o-mini", "sys", "hello", 0.71, 100);
        let k2 = derive_key("ns", "gpt-4o-mini", "sys", "hello", 0.709, 100);
        let k3 = derive_key("ns", "gpt-4o-mini", "sys", "goodbye", 0.71, 100);
        assert_eq!(k1, k2, "temperature bucketing should absorb float noise");
        assert_ne!(k1, k3);
    }

    #[test]
    fn test_put_then_get_round_trip() {
        let cache = EphemeralCache::new(10);
        let key = derive_key("ns", "m", "s", "u", 0.5, 100);
        cache.put("ns", &key, serde_json::json!({"a": 1}), Duration::from_secs(60));
        let got = cache.get("ns", &key);
        assert_eq!(got, Some(serde_json::json!({"a": 1})));
    }

    #[test]
    fn test_get_never_returns_expired_entries() {
        let cache = EphemeralCache::new(10);
        cache.put("ns", "k", serde_json::json!("v"), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("ns", "k"), None);
    }

    #[test]
    fn test_stats_aggregates_across_namespaces() {
        let cache = EphemeralCache::new(10);
        cache.put("a", "k1", serde_json::json!(1), Duration::from_secs(60));
        cache.put("b", "k2", serde_json::json!(2), Duration::from_secs(60));
        let total = cache.stats(None);
        assert_eq!(total.size, 2);
        assert_eq!(cache.stats(Some("a")).size, 1);
    }

    #[test]
    fn test_maintenance_evicts_expired_then_reports_count() {
        let cache = EphemeralCache::new(10);
        cache.put("ns", "k1", serde_json::json!(1), Duration::from_millis(0));
        cache.put("ns", "k2", serde_json::json!(2), Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(5));
        let removed = cache.maintenance();
        assert_eq!(removed, 1);
        assert_eq!(cache.stats(Some("ns")).size, 1);
    }

    #[test]
    fn test_maintenance_enforces_lru_capacity() {
        let cache = EphemeralCache::new(2);
        cache.put("ns", "k1", serde_json::json!(1), Duration::from_secs(60));
        cache.put("ns", "k2", serde_json::json!(2), Duration::from_secs(60));
        cache.put("ns", "k3", serde_json::json!(3), Duration::from_secs(60));
        // LruCache already enforced capacity on insert; maintenance is a no-op here.
        assert_eq!(cache.stats(Some("ns")).size, 2);
        let removed = cache.maintenance();
        assert_eq!(removed, 0);
    }
}
