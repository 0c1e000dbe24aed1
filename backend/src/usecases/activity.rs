use crates::domain::{
    repositories::{
        restaurants::RestaurantRepository, review_notifications::ReviewNotificationRepository,
        scans::ScanRepository,
    },
    value_objects::{reviews::ReviewNotificationDto, scans::ScanDto},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{UseCaseResult, managed_restaurant};
use crate::auth::AuthUser;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

pub struct ActivityUseCase<R, S, N>
where
    R: RestaurantRepository + Send + Sync + 'static,
    S: ScanRepository + Send + Sync + 'static,
    N: ReviewNotificationRepository + Send + Sync + 'static,
{
    restaurant_repo: Arc<R>,
    scan_repo: Arc<S>,
    notification_repo: Arc<N>,
}

impl<R, S, N> ActivityUseCase<R, S, N>
where
    R: RestaurantRepository + Send + Sync + 'static,
    S: ScanRepository + Send + Sync + 'static,
    N: ReviewNotificationRepository + Send + Sync + 'static,
{
    pub fn new(restaurant_repo: Arc<R>, scan_repo: Arc<S>, notification_repo: Arc<N>) -> Self {
        Self {
            restaurant_repo,
            scan_repo,
            notification_repo,
        }
    }

    pub async fn recent_scans(
        &self,
        auth: &AuthUser,
        restaurant_id: Uuid,
        limit: Option<i64>,
    ) -> UseCaseResult<Vec<ScanDto>> {
        managed_restaurant(self.restaurant_repo.as_ref(), auth, restaurant_id).await?;

        let scans = self
            .scan_repo
            .list_recent_for_restaurant(restaurant_id, clamp_limit(limit))
            .await?;

        Ok(scans.into_iter().map(ScanDto::from).collect())
    }

    pub async fn recent_review_notifications(
        &self,
        auth: &AuthUser,
        restaurant_id: Uuid,
        limit: Option<i64>,
    ) -> UseCaseResult<Vec<ReviewNotificationDto>> {
        managed_restaurant(self.restaurant_repo.as_ref(), auth, restaurant_id).await?;

        let notifications = self
            .notification_repo
            .list_recent_for_restaurant(restaurant_id, clamp_limit(limit))
            .await?;

        Ok(notifications
            .into_iter()
            .map(ReviewNotificationDto::from)
            .collect())
    }
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}
