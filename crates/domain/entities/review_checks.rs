use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::review_checks;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = review_checks)]
pub struct ReviewCheckEntity {
    pub id: Uuid,
    pub scan_id: Uuid,
    pub restaurant_id: Uuid,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub api_errors: i32,
    pub next_check_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
    pub last_error: Option<String>,
    pub attributed_scan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = review_checks)]
pub struct InsertReviewCheckEntity {
    pub scan_id: Uuid,
    pub restaurant_id: Uuid,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub api_errors: i32,
    pub next_check_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
