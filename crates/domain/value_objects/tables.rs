use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::tables::TableEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTableModel {
    pub table_number: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTableModel {
    pub table_number: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableDto {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub table_number: String,
    pub label: Option<String>,
    pub is_active: bool,
    pub scan_count: i32,
    pub last_scan_at: Option<DateTime<Utc>>,
}

impl From<TableEntity> for TableDto {
    fn from(value: TableEntity) -> Self {
        Self {
            id: value.id,
            restaurant_id: value.restaurant_id,
            table_number: value.table_number,
            label: value.label,
            is_active: value.is_active,
            scan_count: value.scan_count,
            last_scan_at: value.last_scan_at,
        }
    }
}

pub fn normalize_table_number(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
