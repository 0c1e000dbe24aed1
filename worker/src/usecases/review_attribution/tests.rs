use super::*;
use chrono::Duration;
use crates::domain::{
    entities::{review_notifications::ReviewNotificationEntity, scans::ScanEntity},
    repositories::{
        notifications::MockNotificationDispatcher, restaurants::MockRestaurantRepository,
        review_checks::MockReviewCheckRepository,
        review_notifications::MockReviewNotificationRepository, reviews_api::MockReviewsApi,
        scans::MockScanRepository,
    },
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus, reviews::PlaceReview,
    },
};
use mockall::predicate::eq;

const PLACE_ID: &str = "ChIJ123";

fn restaurant(last_review_count: Option<i32>) -> RestaurantEntity {
    let now = Utc::now();
    RestaurantEntity {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        name: "Pho 99".to_string(),
        slug: "pho-99".to_string(),
        city: None,
        address: None,
        is_active: true,
        subscription_status: SubscriptionStatus::Active.to_string(),
        subscription_expires_at: Some(now + Duration::days(20)),
        google_review_url: Some("https://g.page/r/pho99/review".to_string()),
        google_business_url: None,
        google_place_id: Some(PLACE_ID.to_string()),
        notification_email: Some("owner@example.com".to_string()),
        last_review_count,
        last_review_check_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn scan(restaurant_id: Uuid, created_at: DateTime<Utc>) -> ScanEntity {
    ScanEntity {
        id: Uuid::new_v4(),
        qr_code_id: Uuid::new_v4(),
        table_id: Uuid::new_v4(),
        restaurant_id,
        ip_address: Some("203.0.113.9".to_string()),
        user_agent: None,
        redirected_to: "https://g.page/r/pho99/review".to_string(),
        processed: false,
        resulted_in_review: false,
        created_at,
    }
}

fn check(scan: &ScanEntity, attempts: i32, api_errors: i32) -> ReviewCheckEntity {
    ReviewCheckEntity {
        id: Uuid::new_v4(),
        scan_id: scan.id,
        restaurant_id: scan.restaurant_id,
        status: "running".to_string(),
        attempts,
        max_attempts: 6,
        api_errors,
        next_check_at: scan.created_at,
        locked_at: Some(scan.created_at),
        locked_by: Some("worker-test".to_string()),
        last_error: None,
        attributed_scan_id: None,
        created_at: scan.created_at,
        updated_at: scan.created_at,
    }
}

fn summary(total_reviews: i32) -> PlaceReviewSummary {
    PlaceReviewSummary {
        total_reviews,
        newest_review: Some(PlaceReview {
            author_name: Some("Linh".to_string()),
            text: Some("Great broth".to_string()),
            rating: Some(5),
            published_at: None,
        }),
    }
}

fn stored_notification(insert: InsertReviewNotificationEntity) -> ReviewNotificationEntity {
    ReviewNotificationEntity {
        id: Uuid::new_v4(),
        restaurant_id: insert.restaurant_id,
        table_id: insert.table_id,
        scan_id: insert.scan_id,
        author_name: insert.author_name,
        review_text: insert.review_text,
        rating: insert.rating,
        review_time: insert.review_time,
        notification_sent: insert.notification_sent,
        created_at: insert.created_at,
    }
}

#[derive(Default)]
struct Mocks {
    checks: MockReviewCheckRepository,
    restaurants: MockRestaurantRepository,
    scans: MockScanRepository,
    notifications: MockReviewNotificationRepository,
    reviews_api: MockReviewsApi,
    dispatcher: MockNotificationDispatcher,
}

impl Mocks {
    fn with_restaurant(mut self, restaurant: &RestaurantEntity) -> Self {
        let found = restaurant.clone();
        self.restaurants
            .expect_find_by_id()
            .with(eq(restaurant.id))
            .returning(move |_| Ok(Some(found.clone())));
        self
    }

    fn with_reviews(mut self, total_reviews: i32) -> Self {
        self.reviews_api
            .expect_fetch_place_reviews()
            .withf(|place_id| place_id == PLACE_ID)
            .times(1)
            .returning(move |_| Ok(summary(total_reviews)));
        self
    }

    fn build(self, notify_no_review: bool) -> ReviewAttributionUseCase {
        ReviewAttributionUseCase::new(
            Arc::new(self.checks),
            Arc::new(self.restaurants),
            Arc::new(self.scans),
            Arc::new(self.notifications),
            Arc::new(self.reviews_api),
            Arc::new(self.dispatcher),
            AttributionSettings {
                schedule: ReviewCheckSchedule::default(),
                notify_no_review,
            },
        )
    }
}

#[tokio::test]
async fn unchanged_count_reschedules_and_spends_an_attempt() {
    let restaurant = restaurant(Some(42));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 1, 0);
    let now = Utc::now();

    let mut mocks = Mocks::default().with_restaurant(&restaurant).with_reviews(42);
    mocks
        .restaurants
        .expect_touch_review_check()
        .with(eq(restaurant.id), eq(now))
        .times(1)
        .returning(|_, _| Ok(()));
    mocks
        .checks
        .expect_reschedule()
        .with(
            eq(check.id),
            eq(2),
            eq(0),
            eq(now + Duration::seconds(300)),
            eq(None::<String>),
        )
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));

    let outcome = mocks.build(false).process(&check, now).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Rescheduled);
}

#[tokio::test]
async fn increase_binds_review_to_own_scan_and_notifies() {
    let restaurant = restaurant(Some(42));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 2, 0);
    let now = Utc::now();

    let mut mocks = Mocks::default().with_restaurant(&restaurant).with_reviews(43);
    mocks
        .restaurants
        .expect_compare_and_set_review_count()
        .with(eq(restaurant.id), eq(Some(42)), eq(43), eq(now))
        .times(1)
        .returning(|_, _, _, _| Ok(true));
    let latest = scan.clone();
    mocks
        .scans
        .expect_find_latest_pending_for_restaurant()
        .returning(move |_| Ok(Some(latest.clone())));
    let table_id = scan.table_id;
    let scan_id = scan.id;
    mocks
        .notifications
        .expect_create()
        .withf(move |insert| {
            insert.scan_id == Some(scan_id)
                && insert.table_id == Some(table_id)
                && insert.rating == Some(5)
                && insert.author_name.as_deref() == Some("Linh")
                && !insert.notification_sent
        })
        .times(1)
        .returning(|insert| Ok(stored_notification(insert)));
    mocks
        .scans
        .expect_mark_processed()
        .with(eq(scan.id), eq(true))
        .times(1)
        .returning(|_, _| Ok(true));
    mocks
        .checks
        .expect_close_matched_for_scan()
        .with(eq(scan.id), eq(scan.id))
        .times(1)
        .returning(|_, _| Ok(1));
    mocks
        .dispatcher
        .expect_send_review_detected()
        .times(1)
        .returning(|_, _| Ok(()));
    mocks
        .notifications
        .expect_mark_sent()
        .times(1)
        .returning(|_| Ok(()));
    mocks.checks.expect_reschedule().never();

    let outcome = mocks.build(false).process(&check, now).await.unwrap();
    match outcome {
        CheckOutcome::Matched {
            attributed_scan_id, ..
        } => assert_eq!(attributed_scan_id, scan.id),
        other => panic!("expected a match, got {other:?}"),
    }
}

#[tokio::test]
async fn increase_goes_to_the_newest_pending_scan_and_older_check_keeps_polling() {
    let restaurant = restaurant(Some(42));
    let earlier = scan(restaurant.id, Utc::now() - Duration::minutes(10));
    let later = scan(restaurant.id, Utc::now() - Duration::minutes(2));
    let earlier_check = check(&earlier, 1, 0);
    let now = Utc::now();

    let mut mocks = Mocks::default().with_restaurant(&restaurant).with_reviews(43);
    mocks
        .restaurants
        .expect_compare_and_set_review_count()
        .returning(|_, _, _, _| Ok(true));
    let newest = later.clone();
    mocks
        .scans
        .expect_find_latest_pending_for_restaurant()
        .returning(move |_| Ok(Some(newest.clone())));
    let later_id = later.id;
    mocks
        .notifications
        .expect_create()
        .withf(move |insert| insert.scan_id == Some(later_id))
        .times(1)
        .returning(|insert| Ok(stored_notification(insert)));
    mocks
        .scans
        .expect_mark_processed()
        .with(eq(later.id), eq(true))
        .times(1)
        .returning(|_, _| Ok(true));
    mocks
        .checks
        .expect_close_matched_for_scan()
        .with(eq(later.id), eq(later.id))
        .times(1)
        .returning(|_, _| Ok(1));
    mocks
        .dispatcher
        .expect_send_review_detected()
        .returning(|_, _| Ok(()));
    mocks.notifications.expect_mark_sent().returning(|_| Ok(()));
    mocks
        .checks
        .expect_reschedule()
        .with(
            eq(earlier_check.id),
            eq(2),
            eq(0),
            eq(now + Duration::seconds(300)),
            eq(None::<String>),
        )
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));

    let outcome = mocks
        .build(false)
        .process(&earlier_check, now)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        CheckOutcome::Matched { attributed_scan_id, .. } if attributed_scan_id == later.id
    ));
}

#[tokio::test]
async fn lost_count_race_is_treated_as_no_increase() {
    let restaurant = restaurant(Some(42));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 0, 0);
    let now = Utc::now();

    let mut mocks = Mocks::default().with_restaurant(&restaurant).with_reviews(43);
    mocks
        .restaurants
        .expect_compare_and_set_review_count()
        .times(1)
        .returning(|_, _, _, _| Ok(false));
    mocks.notifications.expect_create().never();
    mocks
        .checks
        .expect_reschedule()
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));

    let outcome = mocks.build(false).process(&check, now).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Rescheduled);
}

#[tokio::test]
async fn unknown_count_records_baseline_without_attribution() {
    let restaurant = restaurant(None);
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 0, 0);
    let now = Utc::now();

    let mut mocks = Mocks::default().with_restaurant(&restaurant).with_reviews(17);
    mocks
        .restaurants
        .expect_compare_and_set_review_count()
        .with(eq(restaurant.id), eq(None::<i32>), eq(17), eq(now))
        .times(1)
        .returning(|_, _, _, _| Ok(true));
    mocks.notifications.expect_create().never();
    mocks
        .checks
        .expect_reschedule()
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));

    let outcome = mocks.build(false).process(&check, now).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Rescheduled);
}

#[tokio::test]
async fn last_attempt_without_review_abandons_and_sends_no_review_notice() {
    let restaurant = restaurant(Some(42));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 5, 0);
    let now = Utc::now();

    let check_id = check.id;

    let mut mocks = Mocks::default().with_restaurant(&restaurant).with_reviews(42);
    mocks
        .restaurants
        .expect_touch_review_check()
        .returning(|_, _| Ok(()));
    mocks
        .checks
        .expect_mark_abandoned()
        .withf(move |id, attempts, api_errors, reason| {
            *id == check_id && *attempts == 6 && *api_errors == 0 && reason == "no review detected"
        })
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    mocks
        .scans
        .expect_mark_processed()
        .with(eq(scan.id), eq(false))
        .times(1)
        .returning(|_, _| Ok(true));
    let found = scan.clone();
    mocks
        .scans
        .expect_find_by_id()
        .with(eq(scan.id))
        .returning(move |_| Ok(Some(found.clone())));
    mocks
        .dispatcher
        .expect_send_no_review_detected()
        .times(1)
        .returning(|_, _| Ok(()));

    let outcome = mocks.build(true).process(&check, now).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Abandoned(AbandonReason::NoReview));
}

#[tokio::test]
async fn api_error_reschedules_without_spending_an_attempt() {
    let restaurant = restaurant(Some(42));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 3, 0);
    let now = Utc::now();

    let check_id = check.id;

    let mut mocks = Mocks::default().with_restaurant(&restaurant);
    mocks
        .reviews_api
        .expect_fetch_place_reviews()
        .returning(|_| Err(anyhow!("places api returned 503")));
    mocks
        .checks
        .expect_reschedule()
        .withf(move |id, attempts, api_errors, _, last_error| {
            *id == check_id
                && *attempts == 3
                && *api_errors == 1
                && last_error.as_deref() == Some("places api returned 503")
        })
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));

    let outcome = mocks.build(false).process(&check, now).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Rescheduled);
}

#[tokio::test]
async fn repeated_api_errors_abandon_the_check() {
    let restaurant = restaurant(Some(42));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 3, 2);
    let now = Utc::now();

    let mut mocks = Mocks::default().with_restaurant(&restaurant);
    mocks
        .reviews_api
        .expect_fetch_place_reviews()
        .returning(|_| Err(anyhow!("timeout")));
    mocks
        .checks
        .expect_mark_abandoned()
        .withf(|_, attempts, api_errors, _| *attempts == 3 && *api_errors == 3)
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    mocks
        .scans
        .expect_mark_processed()
        .with(eq(scan.id), eq(false))
        .returning(|_, _| Ok(true));

    let outcome = mocks.build(false).process(&check, now).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Abandoned(AbandonReason::ApiErrors));
}

#[tokio::test]
async fn inactive_restaurant_abandons_without_calling_the_api() {
    let mut restaurant = restaurant(Some(42));
    restaurant.is_active = false;
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 0, 0);

    let mut mocks = Mocks::default().with_restaurant(&restaurant);
    mocks.reviews_api.expect_fetch_place_reviews().never();
    mocks
        .checks
        .expect_mark_abandoned()
        .withf(|_, _, _, reason| reason == "restaurant inactive")
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    mocks
        .scans
        .expect_mark_processed()
        .returning(|_, _| Ok(true));

    let outcome = mocks.build(false).process(&check, Utc::now()).await.unwrap();
    assert_eq!(
        outcome,
        CheckOutcome::Abandoned(AbandonReason::RestaurantInactive)
    );
}

#[tokio::test]
async fn lapsed_subscription_abandons() {
    let mut restaurant = restaurant(Some(42));
    restaurant.subscription_expires_at = Some(Utc::now() - Duration::days(1));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 0, 0);

    let mut mocks = Mocks::default().with_restaurant(&restaurant);
    mocks.reviews_api.expect_fetch_place_reviews().never();
    mocks
        .checks
        .expect_mark_abandoned()
        .returning(|_, _, _, _| Ok(()));
    mocks
        .scans
        .expect_mark_processed()
        .returning(|_, _| Ok(true));

    let outcome = mocks.build(false).process(&check, Utc::now()).await.unwrap();
    assert_eq!(
        outcome,
        CheckOutcome::Abandoned(AbandonReason::SubscriptionInactive)
    );
}

#[tokio::test]
async fn failed_dispatch_leaves_notification_unsent() {
    let restaurant = restaurant(Some(42));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 0, 0);

    let mut mocks = Mocks::default().with_restaurant(&restaurant).with_reviews(44);
    mocks
        .restaurants
        .expect_compare_and_set_review_count()
        .returning(|_, _, _, _| Ok(true));
    let latest = scan.clone();
    mocks
        .scans
        .expect_find_latest_pending_for_restaurant()
        .returning(move |_| Ok(Some(latest.clone())));
    mocks
        .notifications
        .expect_create()
        .returning(|insert| Ok(stored_notification(insert)));
    mocks
        .scans
        .expect_mark_processed()
        .returning(|_, _| Ok(true));
    mocks
        .checks
        .expect_close_matched_for_scan()
        .returning(|_, _| Ok(1));
    mocks
        .dispatcher
        .expect_send_review_detected()
        .returning(|_, _| Err(anyhow!("smtp relay down")));
    mocks.notifications.expect_mark_sent().never();

    let outcome = mocks.build(false).process(&check, Utc::now()).await.unwrap();
    assert!(matches!(outcome, CheckOutcome::Matched { .. }));
}

#[tokio::test]
async fn decrease_lowers_stored_count_so_the_next_review_is_seen() {
    let restaurant = restaurant(Some(10));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 0, 0);
    let now = Utc::now();

    let mut mocks = Mocks::default().with_restaurant(&restaurant).with_reviews(9);
    mocks
        .restaurants
        .expect_compare_and_set_review_count()
        .with(eq(restaurant.id), eq(Some(10)), eq(9), eq(now))
        .times(1)
        .returning(|_, _, _, _| Ok(true));
    mocks.restaurants.expect_touch_review_check().never();
    mocks.notifications.expect_create().never();
    mocks
        .checks
        .expect_reschedule()
        .withf(|_, attempts, _, _, _| *attempts == 1)
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));

    let outcome = mocks.build(false).process(&check, now).await.unwrap();
    assert_eq!(outcome, CheckOutcome::Rescheduled);
    assert_eq!(
        detect_increase(Some(9), 10),
        CountChange::Increased { previous: 9 }
    );
}

#[tokio::test]
async fn failed_run_spends_an_attempt_and_keeps_the_error() {
    let restaurant = restaurant(Some(42));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 2, 1);
    let check_id = check.id;
    let now = Utc::now();

    let mut mocks = Mocks::default();
    mocks
        .checks
        .expect_reschedule()
        .withf(move |id, attempts, api_errors, _, last_error| {
            *id == check_id
                && *attempts == 3
                && *api_errors == 1
                && last_error.as_deref() == Some("connection reset")
        })
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));

    let outcome = mocks
        .build(false)
        .defer_after_failure(&check, &anyhow!("connection reset"), now)
        .await
        .unwrap();
    assert_eq!(outcome, CheckOutcome::Rescheduled);
}

#[tokio::test]
async fn repeated_failed_runs_abandon_the_check() {
    let restaurant = restaurant(Some(42));
    let scan = scan(restaurant.id, Utc::now());
    let check = check(&scan, 5, 0);

    let mut mocks = Mocks::default();
    mocks.checks.expect_reschedule().never();
    mocks
        .checks
        .expect_mark_abandoned()
        .withf(|_, attempts, _, reason| *attempts == 6 && reason == "processing kept failing")
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    mocks
        .scans
        .expect_mark_processed()
        .with(eq(scan.id), eq(false))
        .times(1)
        .returning(|_, _| Ok(true));

    let outcome = mocks
        .build(false)
        .defer_after_failure(&check, &anyhow!("deadlock detected"), Utc::now())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        CheckOutcome::Abandoned(AbandonReason::ProcessingFailed)
    );
}
