use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::review_checks::ReviewCheckEntity;

#[automock]
#[async_trait]
pub trait ReviewCheckRepository {
    async fn enqueue(
        &self,
        scan_id: Uuid,
        restaurant_id: Uuid,
        next_check_at: DateTime<Utc>,
        max_attempts: i32,
    ) -> Result<Uuid>;

    /// Claims the oldest due pending check (`FOR UPDATE SKIP LOCKED`) and marks it running.
    async fn lock_next_due(&self, worker_id: &str) -> Result<Option<ReviewCheckEntity>>;

    async fn reschedule(
        &self,
        check_id: Uuid,
        attempts: i32,
        api_errors: i32,
        next_check_at: DateTime<Utc>,
        last_error: Option<String>,
    ) -> Result<()>;

    async fn mark_abandoned(
        &self,
        check_id: Uuid,
        attempts: i32,
        api_errors: i32,
        reason: &str,
    ) -> Result<()>;

    async fn close_matched_for_scan(&self, scan_id: Uuid, attributed_scan_id: Uuid)
    -> Result<usize>;

    async fn release_stale_locks(&self, locked_before: DateTime<Utc>) -> Result<usize>;
}
