//! In-memory TTL cache for fetched payloads.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use wayfinder_core::external::{ExternalPayload, PayloadCache};

/// A keyed TTL cache. Expired entries read as absent and are evicted by
/// the read that finds them, so the map never accumulates stale payloads.
pub struct MemoryPayloadCache {
    entries: RwLock<HashMap<String, ExternalPayload>>,
}

impl MemoryPayloadCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryPayloadCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PayloadCache for MemoryPayloadCache {
    async fn get(&self, key: &str) -> Option<ExternalPayload> {
        let now = Utc::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(payload) if !payload.is_expired(now) => return Some(payload.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired. Re-check under the write lock: a concurrent put may have
        // refreshed the entry between the two lock acquisitions.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(payload) if !payload.is_expired(now) => Some(payload.clone()),
            Some(_) => {
                entries.remove(key);
                debug!(key, "Expired payload evicted");
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: &str, payload: ExternalPayload) {
        self.entries.write().await.insert(key.to_string(), payload);
    }
}
