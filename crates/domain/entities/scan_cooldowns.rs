use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::scan_cooldowns;

#[derive(Debug, Clone, PartialEq, Selectable, Queryable, Insertable)]
#[diesel(table_name = scan_cooldowns)]
pub struct ScanCooldownRow {
    pub key: String,
    pub last_seen_at: DateTime<Utc>,
}
