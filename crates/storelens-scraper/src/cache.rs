//! In-process TTL cache for normalized products.
//!
//! The store is an explicitly constructed value, injected into the
//! orchestrator rather than reached through ambient global state, so sweeps
//! and invalidation are testable in isolation. Entries carry only their
//! write instant; freshness is evaluated lazily at read time against the
//! *reading* call's TTL, never by a background timer.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use storelens_core::Product;

/// A cached product snapshot plus the instant it was written.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub product: Product,
    cached_at: Instant,
}

impl CacheEntry {
    /// `true` iff the entry is younger than `ttl_minutes`.
    #[must_use]
    pub fn is_fresh(&self, ttl_minutes: u64) -> bool {
        self.cached_at.elapsed() < Duration::from_secs(ttl_minutes * 60)
    }
}

/// Cache statistics exposed to callers.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    /// Cache keys in sorted order.
    pub keys: Vec<String>,
}

/// Mutex-guarded map from `"product:{shop_domain}:{handle}"` to
/// [`CacheEntry`]. Safe under concurrent readers and writers; no lock is
/// held across an await point.
///
/// Process-lifetime state with no persistence: the store starts empty on
/// every process start.
#[derive(Debug, Default)]
pub struct ProductCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ProductCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(shop_domain: &str, product_handle: &str) -> String {
        format!("product:{shop_domain}:{product_handle}")
    }

    fn domain_prefix(shop_domain: &str) -> String {
        format!("product:{shop_domain}:")
    }

    /// Returns the entry for `(shop_domain, product_handle)`, if present.
    /// No freshness judgment is made here; callers check
    /// [`CacheEntry::is_fresh`] against their own TTL.
    #[must_use]
    pub fn get(&self, shop_domain: &str, product_handle: &str) -> Option<CacheEntry> {
        self.lock().get(&Self::key(shop_domain, product_handle)).cloned()
    }

    /// Stores `product` under `(shop_domain, product_handle)`, overwriting
    /// unconditionally and restamping the write instant.
    pub fn put(&self, shop_domain: &str, product_handle: &str, product: Product) {
        self.lock().insert(
            Self::key(shop_domain, product_handle),
            CacheEntry {
                product,
                cached_at: Instant::now(),
            },
        );
    }

    /// Evicts entries in one of three scopes: the exact key (both arguments
    /// given), every key under a domain (domain only), or the whole store
    /// (neither).
    ///
    /// Domain scope matches the `"product:{domain}:"` key prefix, so
    /// `"a.com"` never evicts keys under `"aa.com"`.
    pub fn invalidate(&self, shop_domain: Option<&str>, product_handle: Option<&str>) {
        let mut entries = self.lock();
        match (shop_domain, product_handle) {
            (Some(domain), Some(handle)) => {
                entries.remove(&Self::key(domain, handle));
            }
            (Some(domain), None) => {
                let prefix = Self::domain_prefix(domain);
                entries.retain(|key, _| !key.starts_with(&prefix));
            }
            _ => entries.clear(),
        }
    }

    /// Removes entries older than `max_age_minutes`.
    ///
    /// The ceiling is a configuration constant independent of any caller's
    /// read TTL; the sweep runs opportunistically before cache reads to
    /// bound memory growth, not on a dedicated timer.
    pub fn sweep_expired(&self, max_age_minutes: u64) {
        let max_age = Duration::from_secs(max_age_minutes * 60);
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.cached_at.elapsed() < max_age);
        let swept = before - entries.len();
        if swept > 0 {
            tracing::debug!(swept, remaining = entries.len(), "swept expired cache entries");
        }
    }

    /// Current size and sorted key list.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
