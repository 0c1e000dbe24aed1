use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::domain::{
    entities::{
        restaurants::RestaurantEntity, review_notifications::ReviewNotificationEntity,
        scans::ScanEntity,
    },
    repositories::notifications::NotificationDispatcher,
};

pub struct LogOnlyDispatcher;

#[async_trait]
impl NotificationDispatcher for LogOnlyDispatcher {
    async fn send_review_detected(
        &self,
        restaurant: &RestaurantEntity,
        notification: &ReviewNotificationEntity,
    ) -> Result<()> {
        info!(
            restaurant_id = %restaurant.id,
            notification_id = %notification.id,
            rating = ?notification.rating,
            "log_only: review detected (e-mail delivery disabled)"
        );
        anyhow::bail!("e-mail delivery disabled")
    }

    async fn send_no_review_detected(
        &self,
        restaurant: &RestaurantEntity,
        scan: &ScanEntity,
    ) -> Result<()> {
        info!(
            restaurant_id = %restaurant.id,
            scan_id = %scan.id,
            "log_only: no review after scan (e-mail delivery disabled)"
        );
        Ok(())
    }
}
