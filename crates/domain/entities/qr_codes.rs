use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::qr_codes;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = qr_codes)]
pub struct QrCodeEntity {
    pub id: Uuid,
    pub table_id: Uuid,
    pub restaurant_id: Uuid,
    pub code: String,
    pub is_active: bool,
    pub scan_count: i32,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = qr_codes)]
pub struct InsertQrCodeEntity {
    pub table_id: Uuid,
    pub restaurant_id: Uuid,
    pub code: String,
    pub is_active: bool,
    pub scan_count: i32,
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
