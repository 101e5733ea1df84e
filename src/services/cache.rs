//! In-process cache store backed by moka

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

use super::CacheStore;
use crate::config::CacheConfig;
use crate::error::Result;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct EntryKey {
    key: String,
    field: String,
}

#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with
struct PerEntryTtl;

impl Expiry<EntryKey, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &EntryKey, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &EntryKey,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// [`CacheStore`] keeping serialized responses in memory
#[derive(Clone)]
pub struct MokaCacheStore {
    cache: Cache<EntryKey, Entry>,
}

impl MokaCacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    /// Shared handle for wiring into analyzers
    pub fn shared(config: &CacheConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let entry_key = EntryKey {
            key: key.to_string(),
            field: field.to_string(),
        };
        Ok(self.cache.get(&entry_key).await.map(|entry| entry.payload))
    }

    async fn set(&self, key: &str, field: &str, value: String, ttl: Duration) -> Result<()> {
        let entry_key = EntryKey {
            key: key.to_string(),
            field: field.to_string(),
        };
        self.cache
            .insert(entry_key, Entry { payload: value, ttl })
            .await;
        Ok(())
    }
}
