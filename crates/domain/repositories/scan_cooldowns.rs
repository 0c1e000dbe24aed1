use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockall::automock;

#[automock]
#[async_trait]
pub trait ScanCooldownStore {
    async fn get(&self, key: &str) -> Result<Option<DateTime<Utc>>>;

    async fn set(&self, key: &str, seen_at: DateTime<Utc>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn sweep(&self, older_than: DateTime<Utc>) -> Result<usize>;

    /// Returns true when the caller claimed the slot.
    async fn claim(&self, key: &str, now: DateTime<Utc>, window: Duration) -> Result<bool>;
}
