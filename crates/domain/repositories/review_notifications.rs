use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::review_notifications::{
    InsertReviewNotificationEntity, ReviewNotificationEntity,
};

#[automock]
#[async_trait]
pub trait ReviewNotificationRepository {
    async fn create(
        &self,
        insert_review_notification_entity: InsertReviewNotificationEntity,
    ) -> Result<ReviewNotificationEntity>;

    async fn mark_sent(&self, notification_id: Uuid) -> Result<()>;

    async fn list_recent_for_restaurant(
        &self,
        restaurant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ReviewNotificationEntity>>;
}
