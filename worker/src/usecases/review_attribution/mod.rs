use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use crates::domain::{
    entities::{
        restaurants::RestaurantEntity, review_checks::ReviewCheckEntity,
        review_notifications::InsertReviewNotificationEntity,
    },
    repositories::{
        notifications::NotificationDispatcher, restaurants::RestaurantRepository,
        review_checks::ReviewCheckRepository,
        review_notifications::ReviewNotificationRepository, reviews_api::ReviewsApi,
        scans::ScanRepository,
    },
    value_objects::{
        review_checks::{CheckProgress, CountChange, NextStep, ReviewCheckSchedule, detect_increase},
        reviews::PlaceReviewSummary,
    },
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    RestaurantMissing,
    RestaurantInactive,
    SubscriptionInactive,
    NoPlaceId,
    ApiErrors,
    NoReview,
    ProcessingFailed,
}

impl AbandonReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbandonReason::RestaurantMissing => "restaurant missing",
            AbandonReason::RestaurantInactive => "restaurant inactive",
            AbandonReason::SubscriptionInactive => "subscription inactive",
            AbandonReason::NoPlaceId => "no place id",
            AbandonReason::ApiErrors => "reviews api kept failing",
            AbandonReason::NoReview => "no review detected",
            AbandonReason::ProcessingFailed => "processing kept failing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Matched {
        attributed_scan_id: Uuid,
        notification_id: Uuid,
    },
    Rescheduled,
    Abandoned(AbandonReason),
}

#[derive(Debug, Clone, Copy)]
pub struct AttributionSettings {
    pub schedule: ReviewCheckSchedule,
    pub notify_no_review: bool,
}

pub struct ReviewAttributionUseCase {
    review_check_repo: Arc<dyn ReviewCheckRepository + Send + Sync>,
    restaurant_repo: Arc<dyn RestaurantRepository + Send + Sync>,
    scan_repo: Arc<dyn ScanRepository + Send + Sync>,
    notification_repo: Arc<dyn ReviewNotificationRepository + Send + Sync>,
    reviews_api: Arc<dyn ReviewsApi + Send + Sync>,
    dispatcher: Arc<dyn NotificationDispatcher + Send + Sync>,
    settings: AttributionSettings,
}

impl ReviewAttributionUseCase {
    pub fn new(
        review_check_repo: Arc<dyn ReviewCheckRepository + Send + Sync>,
        restaurant_repo: Arc<dyn RestaurantRepository + Send + Sync>,
        scan_repo: Arc<dyn ScanRepository + Send + Sync>,
        notification_repo: Arc<dyn ReviewNotificationRepository + Send + Sync>,
        reviews_api: Arc<dyn ReviewsApi + Send + Sync>,
        dispatcher: Arc<dyn NotificationDispatcher + Send + Sync>,
        settings: AttributionSettings,
    ) -> Self {
        Self {
            review_check_repo,
            restaurant_repo,
            scan_repo,
            notification_repo,
            reviews_api,
            dispatcher,
            settings,
        }
    }

    pub async fn lock_next(&self, worker_id: &str) -> Result<Option<ReviewCheckEntity>> {
        self.review_check_repo.lock_next_due(worker_id).await
    }

    pub async fn process(
        &self,
        check: &ReviewCheckEntity,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome> {
        let progress = CheckProgress::of(check, self.settings.schedule.max_api_errors);

        let restaurant = match self.restaurant_repo.find_by_id(check.restaurant_id).await? {
            Some(restaurant) => restaurant,
            None => {
                return self
                    .abandon(check, progress.attempts, progress.api_errors, AbandonReason::RestaurantMissing)
                    .await;
            }
        };

        if let Some(reason) = unservable_reason(&restaurant, now) {
            return self
                .abandon(check, progress.attempts, progress.api_errors, reason)
                .await;
        }
        let Some(place_id) = restaurant.place_id() else {
            return self
                .abandon(check, progress.attempts, progress.api_errors, AbandonReason::NoPlaceId)
                .await;
        };

        let summary = match self.reviews_api.fetch_place_reviews(place_id).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(
                    check_id = %check.id,
                    restaurant_id = %restaurant.id,
                    api_errors = progress.api_errors + 1,
                    error = %err,
                    "review_check: reviews api failed"
                );
                return match progress.after_api_error() {
                    NextStep::Reschedule { attempts, api_errors } => {
                        self.review_check_repo
                            .reschedule(
                                check.id,
                                attempts,
                                api_errors,
                                self.settings.schedule.next_check_at(now),
                                Some(err.to_string()),
                            )
                            .await?;
                        Ok(CheckOutcome::Rescheduled)
                    }
                    NextStep::Abandon { attempts, api_errors } => {
                        self.abandon(check, attempts, api_errors, AbandonReason::ApiErrors)
                            .await
                    }
                };
            }
        };

        match detect_increase(restaurant.last_review_count, summary.total_reviews) {
            CountChange::Unknown => {
                let recorded = self
                    .restaurant_repo
                    .compare_and_set_review_count(restaurant.id, None, summary.total_reviews, now)
                    .await?;
                info!(
                    check_id = %check.id,
                    restaurant_id = %restaurant.id,
                    baseline = summary.total_reviews,
                    recorded,
                    "review_check: baseline review count"
                );
            }
            CountChange::Decreased { previous } => {
                let lowered = self
                    .restaurant_repo
                    .compare_and_set_review_count(
                        restaurant.id,
                        Some(previous),
                        summary.total_reviews,
                        now,
                    )
                    .await?;
                info!(
                    check_id = %check.id,
                    restaurant_id = %restaurant.id,
                    previous,
                    observed = summary.total_reviews,
                    lowered,
                    "review_check: review count went down"
                );
            }
            CountChange::Unchanged => {
                self.restaurant_repo
                    .touch_review_check(restaurant.id, now)
                    .await?;
            }
            CountChange::Increased { previous } => {
                let won = self
                    .restaurant_repo
                    .compare_and_set_review_count(
                        restaurant.id,
                        Some(previous),
                        summary.total_reviews,
                        now,
                    )
                    .await?;

                if won {
                    return self.attribute(check, &restaurant, &summary, progress, now).await;
                }

                info!(
                    check_id = %check.id,
                    restaurant_id = %restaurant.id,
                    "review_check: increase already consumed by another check"
                );
            }
        }

        self.after_poll(check, progress, now).await
    }

    /// A failed run spends an attempt so a persistently failing check still ends.
    pub async fn defer_after_failure(
        &self,
        check: &ReviewCheckEntity,
        failure: &anyhow::Error,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome> {
        let progress = CheckProgress::of(check, self.settings.schedule.max_api_errors);
        match progress.after_poll() {
            NextStep::Reschedule { attempts, api_errors } => {
                self.review_check_repo
                    .reschedule(
                        check.id,
                        attempts,
                        api_errors,
                        self.settings.schedule.next_check_at(now),
                        Some(failure.to_string()),
                    )
                    .await?;
                Ok(CheckOutcome::Rescheduled)
            }
            NextStep::Abandon { attempts, api_errors } => {
                self.abandon(check, attempts, api_errors, AbandonReason::ProcessingFailed)
                    .await
            }
        }
    }

    async fn attribute(
        &self,
        check: &ReviewCheckEntity,
        restaurant: &RestaurantEntity,
        summary: &PlaceReviewSummary,
        progress: CheckProgress,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome> {
        let latest = self
            .scan_repo
            .find_latest_pending_for_restaurant(restaurant.id)
            .await?;
        let target = match latest {
            Some(scan) => scan,
            None => self
                .scan_repo
                .find_by_id(check.scan_id)
                .await?
                .ok_or_else(|| anyhow!("scan {} of review check {} is gone", check.scan_id, check.id))?,
        };

        let newest = summary.newest_review.clone().unwrap_or_default();
        let notification = self
            .notification_repo
            .create(InsertReviewNotificationEntity {
                restaurant_id: restaurant.id,
                table_id: Some(target.table_id),
                scan_id: Some(target.id),
                author_name: newest.author_name,
                review_text: newest.text,
                rating: newest.rating,
                review_time: newest.published_at,
                notification_sent: false,
                created_at: now,
            })
            .await?;

        self.scan_repo.mark_processed(target.id, true).await?;
        let closed = self
            .review_check_repo
            .close_matched_for_scan(target.id, target.id)
            .await?;

        info!(
            check_id = %check.id,
            restaurant_id = %restaurant.id,
            attributed_scan_id = %target.id,
            notification_id = %notification.id,
            closed,
            total_reviews = summary.total_reviews,
            "review_check: review attributed"
        );

        match self
            .dispatcher
            .send_review_detected(restaurant, &notification)
            .await
        {
            Ok(()) => self.notification_repo.mark_sent(notification.id).await?,
            Err(err) => warn!(
                notification_id = %notification.id,
                error = %err,
                "review_check: notification not sent"
            ),
        }

        if target.id != check.scan_id {
            self.after_poll(check, progress, now).await?;
        }

        Ok(CheckOutcome::Matched {
            attributed_scan_id: target.id,
            notification_id: notification.id,
        })
    }

    async fn after_poll(
        &self,
        check: &ReviewCheckEntity,
        progress: CheckProgress,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome> {
        match progress.after_poll() {
            NextStep::Reschedule { attempts, api_errors } => {
                self.review_check_repo
                    .reschedule(
                        check.id,
                        attempts,
                        api_errors,
                        self.settings.schedule.next_check_at(now),
                        None,
                    )
                    .await?;
                Ok(CheckOutcome::Rescheduled)
            }
            NextStep::Abandon { attempts, api_errors } => {
                let outcome = self
                    .abandon(check, attempts, api_errors, AbandonReason::NoReview)
                    .await?;
                if self.settings.notify_no_review {
                    self.notify_no_review(check).await;
                }
                Ok(outcome)
            }
        }
    }

    async fn abandon(
        &self,
        check: &ReviewCheckEntity,
        attempts: i32,
        api_errors: i32,
        reason: AbandonReason,
    ) -> Result<CheckOutcome> {
        self.review_check_repo
            .mark_abandoned(check.id, attempts, api_errors, reason.as_str())
            .await?;
        self.scan_repo.mark_processed(check.scan_id, false).await?;

        info!(
            check_id = %check.id,
            scan_id = %check.scan_id,
            attempts,
            api_errors,
            reason = reason.as_str(),
            "review_check: abandoned"
        );

        Ok(CheckOutcome::Abandoned(reason))
    }

    async fn notify_no_review(&self, check: &ReviewCheckEntity) {
        let loaded = async {
            let restaurant = self.restaurant_repo.find_by_id(check.restaurant_id).await?;
            let scan = self.scan_repo.find_by_id(check.scan_id).await?;
            anyhow::Ok(restaurant.zip(scan))
        };

        let result = match loaded.await {
            Ok(Some((restaurant, scan))) => {
                self.dispatcher
                    .send_no_review_detected(&restaurant, &scan)
                    .await
            }
            Ok(None) => return,
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            error!(check_id = %check.id, error = %err, "review_check: no-review notice failed");
        }
    }
}

fn unservable_reason(restaurant: &RestaurantEntity, now: DateTime<Utc>) -> Option<AbandonReason> {
    if !restaurant.is_active {
        return Some(AbandonReason::RestaurantInactive);
    }
    if !restaurant.subscription_is_servable(now) {
        return Some(AbandonReason::SubscriptionInactive);
    }
    None
}

#[cfg(test)]
mod tests;
