use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::{
    restaurants::RestaurantEntity, review_notifications::ReviewNotificationEntity,
    scans::ScanEntity,
};

#[automock]
#[async_trait]
pub trait NotificationDispatcher {
    async fn send_review_detected(
        &self,
        restaurant: &RestaurantEntity,
        notification: &ReviewNotificationEntity,
    ) -> Result<()>;

    async fn send_no_review_detected(
        &self,
        restaurant: &RestaurantEntity,
        scan: &ScanEntity,
    ) -> Result<()>;
}
