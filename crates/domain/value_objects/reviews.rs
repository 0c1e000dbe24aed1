use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::review_notifications::ReviewNotificationEntity;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceReviewSummary {
    pub total_reviews: i32,
    pub newest_review: Option<PlaceReview>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceReview {
    pub author_name: Option<String>,
    pub text: Option<String>,
    pub rating: Option<i32>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewNotificationDto {
    pub id: Uuid,
    pub table_id: Option<Uuid>,
    pub scan_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub review_text: Option<String>,
    pub rating: Option<i32>,
    pub review_time: Option<DateTime<Utc>>,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewNotificationEntity> for ReviewNotificationDto {
    fn from(value: ReviewNotificationEntity) -> Self {
        Self {
            id: value.id,
            table_id: value.table_id,
            scan_id: value.scan_id,
            author_name: value.author_name,
            review_text: value.review_text,
            rating: value.rating,
            review_time: value.review_time,
            notification_sent: value.notification_sent,
            created_at: value.created_at,
        }
    }
}
