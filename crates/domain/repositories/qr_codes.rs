use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::qr_codes::{InsertQrCodeEntity, QrCodeEntity};

#[automock]
#[async_trait]
pub trait QrCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<QrCodeEntity>>;

    async fn find_by_table(&self, table_id: Uuid) -> Result<Option<QrCodeEntity>>;

    /// Returns the row stored for the table afterwards, `None` on a code collision.
    async fn insert_if_absent(
        &self,
        insert_qr_code_entity: InsertQrCodeEntity,
    ) -> Result<Option<QrCodeEntity>>;

    async fn set_active(&self, qr_code_id: Uuid, is_active: bool) -> Result<()>;

    async fn refresh_redirect_snapshot(&self, restaurant_id: Uuid, redirect_url: &str)
    -> Result<usize>;
}
