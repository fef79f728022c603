// src/services/cache.rs

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use serde_json::Value;

/// Cache de valores JSON com TTL por entrada.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_json(&self, key: &str) -> Option<Value>;
    async fn set_json(&self, key: &str, value: Value, ttl: Duration);
    async fn invalidate(&self, key: &str);
}

#[derive(Clone, Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

// Implementação em memória (moka), limitada em número de entradas.
#[derive(Clone)]
pub struct InMemoryCache {
    inner: MokaCache<String, Entry>,
}

impl InMemoryCache {
    pub const DEFAULT_CAPACITY: u64 = 1000;

    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: MokaCache::builder().max_capacity(max_capacity).build(),
        }
    }

    #[cfg(test)]
    async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_json(&self, key: &str) -> Option<Value> {
        let entry = self.inner.get(key).await?;
        if entry.expires_at <= Instant::now() {
            self.inner.invalidate(key).await;
            return None;
        }
        Some(entry.value)
    }

    async fn set_json(&self, key: &str, value: Value, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.inner.insert(key.to_string(), entry).await;
    }

    async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn returns_value_before_ttl() {
        let cache = InMemoryCache::default();
        cache.set_json("site:aurora", json!({"title": "Aurora"}), Duration::from_secs(60)).await;
        assert_eq!(cache.get_json("site:aurora").await, Some(json!({"title": "Aurora"})));
    }

    #[tokio::test]
    async fn entries_expire_individually() {
        let cache = InMemoryCache::default();
        cache.set_json("short", json!(1), Duration::from_millis(20)).await;
        cache.set_json("long", json!(2), Duration::from_secs(60)).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get_json("short").await, None);
        assert_eq!(cache.get_json("long").await, Some(json!(2)));
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = InMemoryCache::default();
        cache.set_json("k", json!("v"), Duration::from_secs(60)).await;
        cache.invalidate("k").await;
        assert_eq!(cache.get_json("k").await, None);
    }

    #[tokio::test]
    async fn capacity_is_bounded() {
        let cache = InMemoryCache::new(10);
        for i in 0..200 {
            cache.set_json(&format!("k{i}"), json!(i), Duration::from_secs(60)).await;
        }
        assert!(cache.entry_count().await <= 10);
    }
}
