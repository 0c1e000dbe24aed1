use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::qr_codes},
};
use domain::{
    entities::qr_codes::{InsertQrCodeEntity, QrCodeEntity},
    repositories::qr_codes::QrCodeRepository,
};

pub struct QrCodePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl QrCodePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl QrCodeRepository for QrCodePostgres {
    async fn find_by_code(&self, code: &str) -> Result<Option<QrCodeEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = qr_codes::table
            .filter(qr_codes::code.eq(code))
            .select(QrCodeEntity::as_select())
            .first::<QrCodeEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn find_by_table(&self, table_id: Uuid) -> Result<Option<QrCodeEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = qr_codes::table
            .filter(qr_codes::table_id.eq(table_id))
            .select(QrCodeEntity::as_select())
            .first::<QrCodeEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn insert_if_absent(
        &self,
        insert_qr_code_entity: InsertQrCodeEntity,
    ) -> Result<Option<QrCodeEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let table_id = insert_qr_code_entity.table_id;

        // Both unique indexes (code, table_id) are covered by the bare ON CONFLICT.
        let row = conn.transaction::<Option<QrCodeEntity>, diesel::result::Error, _>(|conn| {
            insert_into(qr_codes::table)
                .values(&insert_qr_code_entity)
                .on_conflict_do_nothing()
                .execute(conn)?;

            qr_codes::table
                .filter(qr_codes::table_id.eq(table_id))
                .select(QrCodeEntity::as_select())
                .first::<QrCodeEntity>(conn)
                .optional()
        })?;

        Ok(row)
    }

    async fn set_active(&self, qr_code_id: Uuid, is_active: bool) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(qr_codes::table.find(qr_code_id))
            .set((
                qr_codes::is_active.eq(is_active),
                qr_codes::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn refresh_redirect_snapshot(
        &self,
        restaurant_id: Uuid,
        redirect_url: &str,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(qr_codes::table.filter(qr_codes::restaurant_id.eq(restaurant_id)))
            .set((
                qr_codes::redirect_url.eq(Some(redirect_url)),
                qr_codes::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated)
    }
}
