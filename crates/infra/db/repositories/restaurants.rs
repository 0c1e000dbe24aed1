use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{dining_tables, restaurants},
    },
};
use domain::{
    entities::restaurants::{InsertRestaurantEntity, RestaurantEntity, UpdateRestaurantEntity},
    repositories::restaurants::RestaurantRepository,
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

pub struct RestaurantPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl RestaurantPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl RestaurantRepository for RestaurantPostgres {
    async fn create(
        &self,
        insert_restaurant_entity: InsertRestaurantEntity,
    ) -> Result<RestaurantEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(restaurants::table)
            .values(&insert_restaurant_entity)
            .returning(RestaurantEntity::as_returning())
            .get_result::<RestaurantEntity>(&mut conn)?;

        Ok(row)
    }

    async fn find_by_id(&self, restaurant_id: Uuid) -> Result<Option<RestaurantEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = restaurants::table
            .find(restaurant_id)
            .select(RestaurantEntity::as_select())
            .first::<RestaurantEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<RestaurantEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = restaurants::table
            .filter(restaurants::slug.eq(slug))
            .select(RestaurantEntity::as_select())
            .first::<RestaurantEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn list(&self, owner_id: Option<Uuid>) -> Result<Vec<RestaurantEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = restaurants::table.into_boxed();
        if let Some(owner_id) = owner_id {
            query = query.filter(restaurants::owner_id.eq(owner_id));
        }

        let rows = query
            .order(restaurants::created_at.desc())
            .select(RestaurantEntity::as_select())
            .load::<RestaurantEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn update(
        &self,
        restaurant_id: Uuid,
        update_restaurant_entity: UpdateRestaurantEntity,
    ) -> Result<RestaurantEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(restaurants::table.find(restaurant_id))
            .set(&update_restaurant_entity)
            .returning(RestaurantEntity::as_returning())
            .get_result::<RestaurantEntity>(&mut conn)?;

        Ok(row)
    }

    async fn set_active(&self, restaurant_id: Uuid, is_active: bool) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            update(restaurants::table.find(restaurant_id))
                .set((
                    restaurants::is_active.eq(is_active),
                    restaurants::updated_at.eq(now),
                ))
                .execute(conn)?;

            // Tables are only cascaded on the way down; owners re-enable them one by one.
            if !is_active {
                update(dining_tables::table.filter(dining_tables::restaurant_id.eq(restaurant_id)))
                    .set((
                        dining_tables::is_active.eq(false),
                        dining_tables::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }

            Ok(())
        })?;

        Ok(())
    }

    async fn update_subscription_state(
        &self,
        restaurant_id: Uuid,
        status: SubscriptionStatus,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(restaurants::table.find(restaurant_id))
            .set((
                restaurants::subscription_status.eq(status.to_string()),
                restaurants::subscription_expires_at.eq(expires_at),
                restaurants::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn compare_and_set_review_count(
        &self,
        restaurant_id: Uuid,
        expected: Option<i32>,
        new_count: i32,
        checked_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let changes = (
            restaurants::last_review_count.eq(Some(new_count)),
            restaurants::last_review_check_at.eq(Some(checked_at)),
            restaurants::updated_at.eq(checked_at),
        );
        let target = restaurants::table.filter(restaurants::id.eq(restaurant_id));

        let updated = match expected {
            Some(expected) => update(target.filter(restaurants::last_review_count.eq(expected)))
                .set(changes)
                .execute(&mut conn)?,
            None => update(target.filter(restaurants::last_review_count.is_null()))
                .set(changes)
                .execute(&mut conn)?,
        };

        Ok(updated == 1)
    }

    async fn touch_review_check(
        &self,
        restaurant_id: Uuid,
        checked_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(restaurants::table.find(restaurant_id))
            .set(restaurants::last_review_check_at.eq(Some(checked_at)))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_lapsed_subscriptions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<RestaurantEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = restaurants::table
            .filter(restaurants::subscription_status.eq_any([
                SubscriptionStatus::Trial.to_string(),
                SubscriptionStatus::Active.to_string(),
            ]))
            .filter(restaurants::subscription_expires_at.lt(now))
            .select(RestaurantEntity::as_select())
            .load::<RestaurantEntity>(&mut conn)?;

        Ok(rows)
    }
}
