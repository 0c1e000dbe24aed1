use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::repositories::scan_cooldowns::ScanCooldownStore;

#[derive(Default)]
pub struct InMemoryScanCooldownStore {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryScanCooldownStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl ScanCooldownStore for InMemoryScanCooldownStore {
    async fn get(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.entries.lock().await.get(key).copied())
    }

    async fn set(&self, key: &str, seen_at: DateTime<Utc>) -> Result<()> {
        self.entries.lock().await.insert(key.to_string(), seen_at);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn sweep(&self, older_than: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, last_seen_at| *last_seen_at >= older_than);
        Ok(before - entries.len())
    }

    async fn claim(&self, key: &str, now: DateTime<Utc>, window: Duration) -> Result<bool> {
        let mut entries = self.entries.lock().await;

        if let Some(last_seen_at) = entries.get(key) {
            if now - *last_seen_at < window {
                return Ok(false);
            }
        }

        entries.insert(key.to_string(), now);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repeat_scan_inside_window_is_rejected() {
        let store = InMemoryScanCooldownStore::new();
        let now = Utc::now();
        let window = Duration::seconds(30);

        assert!(store.claim("AB23CD45EF:10.0.0.1", now, window).await.unwrap());
        assert!(
            !store
                .claim("AB23CD45EF:10.0.0.1", now + Duration::seconds(10), window)
                .await
                .unwrap()
        );
        // The rejected attempt must not extend the window.
        assert!(
            store
                .claim("AB23CD45EF:10.0.0.1", now + Duration::seconds(30), window)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn keys_are_independent_per_ip() {
        let store = InMemoryScanCooldownStore::new();
        let now = Utc::now();
        let window = Duration::seconds(30);

        assert!(store.claim("AB23CD45EF:10.0.0.1", now, window).await.unwrap());
        assert!(store.claim("AB23CD45EF:10.0.0.2", now, window).await.unwrap());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn sweep_drops_only_stale_entries() {
        let store = InMemoryScanCooldownStore::new();
        let now = Utc::now();

        store.set("old", now - Duration::minutes(10)).await.unwrap();
        store.set("fresh", now).await.unwrap();

        let removed = store.sweep(now - Duration::minutes(1)).await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.get("old").await.unwrap(), None);
        assert_eq!(store.get("fresh").await.unwrap(), Some(now));
    }

    #[tokio::test]
    async fn delete_reopens_the_window() {
        let store = InMemoryScanCooldownStore::new();
        let now = Utc::now();
        let window = Duration::seconds(30);

        assert!(store.claim("key", now, window).await.unwrap());
        store.delete("key").await.unwrap();
        assert!(store.claim("key", now, window).await.unwrap());
    }
}
