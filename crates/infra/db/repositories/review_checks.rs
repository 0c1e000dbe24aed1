use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::review_checks},
};
use domain::{
    entities::review_checks::{InsertReviewCheckEntity, ReviewCheckEntity},
    repositories::review_checks::ReviewCheckRepository,
    value_objects::enums::review_check_statuses::ReviewCheckStatus,
};

pub struct ReviewCheckPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ReviewCheckPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ReviewCheckRepository for ReviewCheckPostgres {
    async fn enqueue(
        &self,
        scan_id: Uuid,
        restaurant_id: Uuid,
        next_check_at: DateTime<Utc>,
        max_attempts: i32,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let insert_entity = InsertReviewCheckEntity {
            scan_id,
            restaurant_id,
            status: ReviewCheckStatus::Pending.to_string(),
            attempts: 0,
            max_attempts,
            api_errors: 0,
            next_check_at,
            created_at: now,
            updated_at: now,
        };

        let id = insert_into(review_checks::table)
            .values(&insert_entity)
            .returning(review_checks::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(id)
    }

    async fn lock_next_due(&self, worker_id: &str) -> Result<Option<ReviewCheckEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();

        let check = conn.transaction::<Option<ReviewCheckEntity>, diesel::result::Error, _>(
            |conn| {
                let candidate = review_checks::table
                    .select(ReviewCheckEntity::as_select())
                    .filter(review_checks::status.eq(ReviewCheckStatus::Pending.to_string()))
                    .filter(review_checks::next_check_at.le(current_time))
                    .order(review_checks::next_check_at.asc())
                    .for_update()
                    .skip_locked()
                    .first::<ReviewCheckEntity>(conn)
                    .optional()?;

                let Some(check) = candidate else {
                    return Ok(None);
                };

                let locked = update(review_checks::table.find(check.id))
                    .set((
                        review_checks::status.eq(ReviewCheckStatus::Running.to_string()),
                        review_checks::locked_at.eq(Some(current_time)),
                        review_checks::locked_by.eq(Some(worker_id)),
                        review_checks::updated_at.eq(current_time),
                    ))
                    .returning(ReviewCheckEntity::as_returning())
                    .get_result::<ReviewCheckEntity>(conn)?;

                Ok(Some(locked))
            },
        )?;

        Ok(check)
    }

    async fn reschedule(
        &self,
        check_id: Uuid,
        attempts: i32,
        api_errors: i32,
        next_check_at: DateTime<Utc>,
        last_error: Option<String>,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(
            review_checks::table
                .filter(review_checks::id.eq(check_id))
                .filter(review_checks::status.eq(ReviewCheckStatus::Running.to_string())),
        )
        .set((
            review_checks::status.eq(ReviewCheckStatus::Pending.to_string()),
            review_checks::attempts.eq(attempts),
            review_checks::api_errors.eq(api_errors),
            review_checks::next_check_at.eq(next_check_at),
            review_checks::last_error.eq(last_error),
            review_checks::locked_at.eq::<Option<DateTime<Utc>>>(None),
            review_checks::locked_by.eq::<Option<String>>(None),
            review_checks::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_abandoned(
        &self,
        check_id: Uuid,
        attempts: i32,
        api_errors: i32,
        reason: &str,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(
            review_checks::table
                .filter(review_checks::id.eq(check_id))
                .filter(review_checks::status.eq(ReviewCheckStatus::Running.to_string())),
        )
        .set((
            review_checks::status.eq(ReviewCheckStatus::Abandoned.to_string()),
            review_checks::attempts.eq(attempts),
            review_checks::api_errors.eq(api_errors),
            review_checks::last_error.eq(Some(reason)),
            review_checks::locked_at.eq::<Option<DateTime<Utc>>>(None),
            review_checks::locked_by.eq::<Option<String>>(None),
            review_checks::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    async fn close_matched_for_scan(
        &self,
        scan_id: Uuid,
        attributed_scan_id: Uuid,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(
            review_checks::table
                .filter(review_checks::scan_id.eq(scan_id))
                .filter(review_checks::status.eq_any([
                    ReviewCheckStatus::Pending.to_string(),
                    ReviewCheckStatus::Running.to_string(),
                ])),
        )
        .set((
            review_checks::status.eq(ReviewCheckStatus::Matched.to_string()),
            review_checks::attributed_scan_id.eq(Some(attributed_scan_id)),
            review_checks::locked_at.eq::<Option<DateTime<Utc>>>(None),
            review_checks::locked_by.eq::<Option<String>>(None),
            review_checks::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated)
    }

    async fn release_stale_locks(&self, locked_before: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let released = update(
            review_checks::table
                .filter(review_checks::status.eq(ReviewCheckStatus::Running.to_string()))
                .filter(review_checks::locked_at.lt(locked_before)),
        )
        .set((
            review_checks::status.eq(ReviewCheckStatus::Pending.to_string()),
            review_checks::locked_at.eq::<Option<DateTime<Utc>>>(None),
            review_checks::locked_by.eq::<Option<String>>(None),
            review_checks::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(released)
    }
}
