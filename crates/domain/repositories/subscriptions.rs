use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_current_active(&self, restaurant_id: Uuid)
    -> Result<Option<SubscriptionEntity>>;

    async fn replace_active_subscription(
        &self,
        restaurant_id: Uuid,
        plan_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<SubscriptionEntity>;

    async fn cancel_active(&self, restaurant_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    async fn expire_restaurant(&self, restaurant_id: Uuid, now: DateTime<Utc>) -> Result<()>;
}
