use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::scans::ScanEntity;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ScanMetadata {
    pub fn cooldown_key(&self, code: &str) -> String {
        format!(
            "{}:{}",
            code,
            self.ip_address.as_deref().unwrap_or("unknown")
        )
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScanDto {
    pub id: Uuid,
    pub qr_code_id: Uuid,
    pub table_id: Uuid,
    pub redirected_to: String,
    pub processed: bool,
    pub resulted_in_review: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ScanEntity> for ScanDto {
    fn from(value: ScanEntity) -> Self {
        Self {
            id: value.id,
            qr_code_id: value.qr_code_id,
            table_id: value.table_id,
            redirected_to: value.redirected_to,
            processed: value.processed,
            resulted_in_review: value.resulted_in_review,
            created_at: value.created_at,
        }
    }
}
