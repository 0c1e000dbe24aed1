use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::dining_tables;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = dining_tables)]
pub struct TableEntity {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub table_number: String,
    pub label: Option<String>,
    pub is_active: bool,
    pub scan_count: i32,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = dining_tables)]
pub struct InsertTableEntity {
    pub restaurant_id: Uuid,
    pub table_number: String,
    pub label: Option<String>,
    pub is_active: bool,
    pub scan_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = dining_tables)]
pub struct UpdateTableEntity {
    pub table_number: Option<String>,
    pub label: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}
