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
        schema::{restaurants, subscriptions},
    },
};
use domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    repositories::subscriptions::SubscriptionRepository,
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_current_active(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = subscriptions::table
            .filter(subscriptions::restaurant_id.eq(restaurant_id))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .order(subscriptions::starts_at.desc())
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn replace_active_subscription(
        &self,
        restaurant_id: Uuid,
        plan_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<SubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = conn.transaction::<SubscriptionEntity, diesel::result::Error, _>(|conn| {
            update(
                subscriptions::table
                    .filter(subscriptions::restaurant_id.eq(restaurant_id))
                    .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string())),
            )
            .set((
                subscriptions::status.eq(SubscriptionStatus::Cancelled.to_string()),
                subscriptions::cancelled_at.eq(Some(starts_at)),
            ))
            .execute(conn)?;

            let inserted = insert_into(subscriptions::table)
                .values(&InsertSubscriptionEntity {
                    restaurant_id,
                    plan_id,
                    status: SubscriptionStatus::Active.to_string(),
                    starts_at,
                    ends_at,
                    cancelled_at: None,
                    created_at: starts_at,
                })
                .returning(SubscriptionEntity::as_returning())
                .get_result::<SubscriptionEntity>(conn)?;

            update(restaurants::table.find(restaurant_id))
                .set((
                    restaurants::subscription_status.eq(SubscriptionStatus::Active.to_string()),
                    restaurants::subscription_expires_at.eq(Some(ends_at)),
                    restaurants::updated_at.eq(starts_at),
                ))
                .execute(conn)?;

            Ok(inserted)
        })?;

        Ok(row)
    }

    async fn cancel_active(&self, restaurant_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let cancelled =
            conn.transaction::<Option<SubscriptionEntity>, diesel::result::Error, _>(|conn| {
                let rows = update(
                    subscriptions::table
                        .filter(subscriptions::restaurant_id.eq(restaurant_id))
                        .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string())),
                )
                .set((
                    subscriptions::status.eq(SubscriptionStatus::Cancelled.to_string()),
                    subscriptions::cancelled_at.eq(Some(now)),
                ))
                .returning(SubscriptionEntity::as_returning())
                .get_results::<SubscriptionEntity>(conn)?;

                if rows.is_empty() {
                    return Ok(None);
                }

                update(restaurants::table.find(restaurant_id))
                    .set((
                        restaurants::subscription_status
                            .eq(SubscriptionStatus::Cancelled.to_string()),
                        restaurants::updated_at.eq(now),
                    ))
                    .execute(conn)?;

                Ok(rows.into_iter().next())
            })?;

        Ok(cancelled)
    }

    async fn expire_restaurant(&self, restaurant_id: Uuid, now: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            update(
                subscriptions::table
                    .filter(subscriptions::restaurant_id.eq(restaurant_id))
                    .filter(subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
                    .filter(subscriptions::ends_at.le(now)),
            )
            .set(subscriptions::status.eq(SubscriptionStatus::Expired.to_string()))
            .execute(conn)?;

            // Guarded on the status so a renewal racing the sweep is not overwritten.
            update(
                restaurants::table
                    .filter(restaurants::id.eq(restaurant_id))
                    .filter(restaurants::subscription_status.eq_any([
                        SubscriptionStatus::Trial.to_string(),
                        SubscriptionStatus::Active.to_string(),
                    ]))
                    .filter(restaurants::subscription_expires_at.le(now)),
            )
            .set((
                restaurants::subscription_status.eq(SubscriptionStatus::Expired.to_string()),
                restaurants::updated_at.eq(now),
            ))
            .execute(conn)?;

            Ok(())
        })?;

        Ok(())
    }
}
