use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::tables::{InsertTableEntity, TableEntity, UpdateTableEntity};

#[automock]
#[async_trait]
pub trait TableRepository {
    /// Locks the restaurant row, then inserts only while it has fewer than `max_tables`
    /// tables. `None` means the limit was reached.
    async fn create_within_quota(
        &self,
        insert_table_entity: InsertTableEntity,
        max_tables: i64,
    ) -> Result<Option<TableEntity>>;

    async fn find_by_id(&self, table_id: Uuid) -> Result<Option<TableEntity>>;

    async fn find_by_number(
        &self,
        restaurant_id: Uuid,
        table_number: &str,
    ) -> Result<Option<TableEntity>>;

    async fn list_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<TableEntity>>;

    async fn update(
        &self,
        table_id: Uuid,
        update_table_entity: UpdateTableEntity,
    ) -> Result<TableEntity>;

    async fn set_active(&self, table_id: Uuid, is_active: bool) -> Result<()>;
}
