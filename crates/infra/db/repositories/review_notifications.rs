use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::review_notifications},
};
use domain::{
    entities::review_notifications::{InsertReviewNotificationEntity, ReviewNotificationEntity},
    repositories::review_notifications::ReviewNotificationRepository,
};

pub struct ReviewNotificationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ReviewNotificationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ReviewNotificationRepository for ReviewNotificationPostgres {
    async fn create(
        &self,
        insert_review_notification_entity: InsertReviewNotificationEntity,
    ) -> Result<ReviewNotificationEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(review_notifications::table)
            .values(&insert_review_notification_entity)
            .returning(ReviewNotificationEntity::as_returning())
            .get_result::<ReviewNotificationEntity>(&mut conn)?;

        Ok(row)
    }

    async fn mark_sent(&self, notification_id: Uuid) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(review_notifications::table.find(notification_id))
            .set(review_notifications::notification_sent.eq(true))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_recent_for_restaurant(
        &self,
        restaurant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ReviewNotificationEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = review_notifications::table
            .filter(review_notifications::restaurant_id.eq(restaurant_id))
            .order(review_notifications::created_at.desc())
            .limit(limit)
            .select(ReviewNotificationEntity::as_select())
            .load::<ReviewNotificationEntity>(&mut conn)?;

        Ok(rows)
    }
}
