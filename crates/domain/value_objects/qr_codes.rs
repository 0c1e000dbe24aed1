use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::qr_codes::QrCodeEntity;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 10;

pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn scan_url(public_base_url: &str, code: &str) -> String {
    format!("{}/scan/{}", public_base_url.trim_end_matches('/'), code)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QrCodeDto {
    pub id: Uuid,
    pub table_id: Uuid,
    pub restaurant_id: Uuid,
    pub code: String,
    pub scan_url: String,
    pub is_active: bool,
    pub scan_count: i32,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub redirect_url: Option<String>,
}

impl QrCodeDto {
    pub fn from_entity(entity: QrCodeEntity, public_base_url: &str) -> Self {
        Self {
            scan_url: scan_url(public_base_url, &entity.code),
            id: entity.id,
            table_id: entity.table_id,
            restaurant_id: entity.restaurant_id,
            code: entity.code,
            is_active: entity.is_active,
            scan_count: entity.scan_count,
            last_scan_at: entity.last_scan_at,
            redirect_url: entity.redirect_url,
        }
    }
}
