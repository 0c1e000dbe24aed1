use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::restaurants::{InsertRestaurantEntity, RestaurantEntity, UpdateRestaurantEntity},
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

#[automock]
#[async_trait]
pub trait RestaurantRepository {
    async fn create(&self, insert_restaurant_entity: InsertRestaurantEntity)
    -> Result<RestaurantEntity>;

    async fn find_by_id(&self, restaurant_id: Uuid) -> Result<Option<RestaurantEntity>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<RestaurantEntity>>;

    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<RestaurantEntity>>;

    async fn update(
        &self,
        restaurant_id: Uuid,
        update_restaurant_entity: UpdateRestaurantEntity,
    ) -> Result<RestaurantEntity>;

    async fn set_active(&self, restaurant_id: Uuid, is_active: bool) -> Result<()>;

    async fn update_subscription_state(
        &self,
        restaurant_id: Uuid,
        status: SubscriptionStatus,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Writes `new_count` only when the stored count still equals `expected`.
    async fn compare_and_set_review_count(
        &self,
        restaurant_id: Uuid,
        expected: Option<i32>,
        new_count: i32,
        checked_at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn touch_review_check(&self, restaurant_id: Uuid, checked_at: DateTime<Utc>)
    -> Result<()>;

    async fn list_lapsed_subscriptions(&self, now: DateTime<Utc>) -> Result<Vec<RestaurantEntity>>;
}
