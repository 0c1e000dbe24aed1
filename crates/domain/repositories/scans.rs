use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::scans::{InsertScanEntity, ScanEntity};

#[automock]
#[async_trait]
pub trait ScanRepository {
    async fn record_scan(&self, insert_scan_entity: InsertScanEntity) -> Result<ScanEntity>;

    async fn find_by_id(&self, scan_id: Uuid) -> Result<Option<ScanEntity>>;

    async fn find_latest_pending_for_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Option<ScanEntity>>;

    async fn mark_processed(&self, scan_id: Uuid, resulted_in_review: bool) -> Result<bool>;

    async fn list_recent_for_restaurant(
        &self,
        restaurant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ScanEntity>>;
}
