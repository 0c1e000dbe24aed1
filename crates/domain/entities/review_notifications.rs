use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::review_notifications;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = review_notifications)]
pub struct ReviewNotificationEntity {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub table_id: Option<Uuid>,
    pub scan_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub review_text: Option<String>,
    pub rating: Option<i32>,
    pub review_time: Option<DateTime<Utc>>,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = review_notifications)]
pub struct InsertReviewNotificationEntity {
    pub restaurant_id: Uuid,
    pub table_id: Option<Uuid>,
    pub scan_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub review_text: Option<String>,
    pub rating: Option<i32>,
    pub review_time: Option<DateTime<Utc>>,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
}
