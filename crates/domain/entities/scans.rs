use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::scans;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = scans)]
pub struct ScanEntity {
    pub id: Uuid,
    pub qr_code_id: Uuid,
    pub table_id: Uuid,
    pub restaurant_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub redirected_to: String,
    pub processed: bool,
    pub resulted_in_review: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = scans)]
pub struct InsertScanEntity {
    pub qr_code_id: Uuid,
    pub table_id: Uuid,
    pub restaurant_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub redirected_to: String,
    pub processed: bool,
    pub resulted_in_review: bool,
    pub created_at: DateTime<Utc>,
}
