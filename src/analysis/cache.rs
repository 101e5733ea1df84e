//! Response caching shared by the recipient and contract analyzers

use std::fmt;
use std::time::Duration;

use alloy::primitives::{keccak256, Address};

use super::result::AnalysisResponse;
use crate::services::CacheStore;

/// Cache field for recipient analysis responses
pub const RECIPIENT_FIELD: &str = "recipient";

/// Cache field for contract analysis responses
pub const CONTRACT_FIELD: &str = "contract";

/// `{chain_id}:{safe}:{hash}` where `hash` covers the sorted, de-duplicated
/// subject addresses plus any extra key material
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(chain_id: u64, safe: Address, subjects: &[Address]) -> Self {
        Self::with_material(chain_id, safe, subjects, &[])
    }

    pub fn with_material(chain_id: u64, safe: Address, subjects: &[Address], extra: &[u8]) -> Self {
        let mut sorted = subjects.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut material = Vec::with_capacity(sorted.len() * 20 + extra.len());
        for subject in &sorted {
            material.extend_from_slice(subject.as_slice());
        }
        material.extend_from_slice(extra);

        Self(format!("{chain_id}:{safe}:{}", keccak256(&material)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads a cached response. Store errors and corrupt payloads count as a miss.
pub(crate) async fn read_cached(
    cache: &dyn CacheStore,
    key: &CacheKey,
    field: &'static str,
) -> Option<AnalysisResponse> {
    let payload = match cache.get(key.as_str(), field).await {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            tracing::debug!(event = "cache_miss", key = %key, field);
            return None;
        }
        Err(e) => {
            tracing::warn!(event = "cache_miss", key = %key, field, error = %e, "cache read failed");
            return None;
        }
    };

    match serde_json::from_str(&payload) {
        Ok(response) => {
            tracing::debug!(event = "cache_hit", key = %key, field);
            Some(response)
        }
        Err(e) => {
            tracing::warn!(event = "cache_miss", key = %key, field, error = %e, "discarding corrupt cache payload");
            None
        }
    }
}

/// Writes `response` unless it records a failure
pub(crate) async fn write_cached(
    cache: &dyn CacheStore,
    key: &CacheKey,
    field: &'static str,
    response: &AnalysisResponse,
    ttl: Duration,
) {
    if response.values().any(|grouped| grouped.has_failures()) {
        tracing::debug!(key = %key, field, "not caching response with failed checks");
        return;
    }

    let payload = match serde_json::to_string(response) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(key = %key, field, error = %e, "failed to serialize response for cache");
            return;
        }
    };

    if let Err(e) = cache.set(key.as_str(), field, payload, ttl).await {
        tracing::warn!(key = %key, field, error = %e, "cache write failed");
    }
}
