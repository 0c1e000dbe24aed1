use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::{
    RunQueryDsl, delete, insert_into,
    prelude::*,
    sql_query,
    sql_types::{Text, Timestamptz},
};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::scan_cooldowns},
};
use domain::{
    entities::scan_cooldowns::ScanCooldownRow, repositories::scan_cooldowns::ScanCooldownStore,
};

pub struct ScanCooldownPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ScanCooldownPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ScanCooldownStore for ScanCooldownPostgres {
    async fn get(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let last_seen_at = scan_cooldowns::table
            .find(key)
            .select(scan_cooldowns::last_seen_at)
            .first::<DateTime<Utc>>(&mut conn)
            .optional()?;

        Ok(last_seen_at)
    }

    async fn set(&self, key: &str, seen_at: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = ScanCooldownRow {
            key: key.to_string(),
            last_seen_at: seen_at,
        };

        insert_into(scan_cooldowns::table)
            .values(&row)
            .on_conflict(scan_cooldowns::key)
            .do_update()
            .set(scan_cooldowns::last_seen_at.eq(seen_at))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(scan_cooldowns::table.find(key)).execute(&mut conn)?;

        Ok(())
    }

    async fn sweep(&self, older_than: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let removed = delete(scan_cooldowns::table.filter(scan_cooldowns::last_seen_at.lt(older_than)))
            .execute(&mut conn)?;

        Ok(removed)
    }

    async fn claim(&self, key: &str, now: DateTime<Utc>, window: Duration) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let cutoff = now - window;

        // Zero affected rows means the conditional upsert found a fresh entry.
        let affected = sql_query(
            "INSERT INTO scan_cooldowns (key, last_seen_at) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET last_seen_at = EXCLUDED.last_seen_at \
             WHERE scan_cooldowns.last_seen_at <= $3",
        )
        .bind::<Text, _>(key)
        .bind::<Timestamptz, _>(now)
        .bind::<Timestamptz, _>(cutoff)
        .execute(&mut conn)?;

        Ok(affected == 1)
    }
}
