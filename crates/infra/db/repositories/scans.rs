use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{dining_tables, qr_codes, scans},
    },
};
use domain::{
    entities::scans::{InsertScanEntity, ScanEntity},
    repositories::scans::ScanRepository,
};

pub struct ScanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ScanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ScanRepository for ScanPostgres {
    async fn record_scan(&self, insert_scan_entity: InsertScanEntity) -> Result<ScanEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let scanned_at = insert_scan_entity.created_at;

        let scan = conn.transaction::<ScanEntity, diesel::result::Error, _>(|conn| {
            let scan = insert_into(scans::table)
                .values(&insert_scan_entity)
                .returning(ScanEntity::as_returning())
                .get_result::<ScanEntity>(conn)?;

            update(qr_codes::table.find(scan.qr_code_id))
                .set((
                    qr_codes::scan_count.eq(qr_codes::scan_count + 1),
                    qr_codes::last_scan_at.eq(Some(scanned_at)),
                    qr_codes::updated_at.eq(scanned_at),
                ))
                .execute(conn)?;

            update(dining_tables::table.find(scan.table_id))
                .set((
                    dining_tables::scan_count.eq(dining_tables::scan_count + 1),
                    dining_tables::last_scan_at.eq(Some(scanned_at)),
                    dining_tables::updated_at.eq(scanned_at),
                ))
                .execute(conn)?;

            Ok(scan)
        })?;

        Ok(scan)
    }

    async fn find_by_id(&self, scan_id: Uuid) -> Result<Option<ScanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = scans::table
            .find(scan_id)
            .select(ScanEntity::as_select())
            .first::<ScanEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn find_latest_pending_for_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Option<ScanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = scans::table
            .filter(scans::restaurant_id.eq(restaurant_id))
            .filter(scans::processed.eq(false))
            .order(scans::created_at.desc())
            .select(ScanEntity::as_select())
            .first::<ScanEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn mark_processed(&self, scan_id: Uuid, resulted_in_review: bool) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(
            scans::table
                .filter(scans::id.eq(scan_id))
                .filter(scans::processed.eq(false)),
        )
        .set((
            scans::processed.eq(true),
            scans::resulted_in_review.eq(resulted_in_review),
        ))
        .execute(&mut conn)?;

        Ok(updated == 1)
    }

    async fn list_recent_for_restaurant(
        &self,
        restaurant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ScanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = scans::table
            .filter(scans::restaurant_id.eq(restaurant_id))
            .order(scans::created_at.desc())
            .limit(limit)
            .select(ScanEntity::as_select())
            .load::<ScanEntity>(&mut conn)?;

        Ok(rows)
    }
}
