use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{dining_tables, restaurants},
    },
};
use domain::{
    entities::tables::{InsertTableEntity, TableEntity, UpdateTableEntity},
    repositories::tables::TableRepository,
};

pub struct TablePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TablePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TableRepository for TablePostgres {
    async fn create_within_quota(
        &self,
        insert_table_entity: InsertTableEntity,
        max_tables: i64,
    ) -> Result<Option<TableEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let restaurant_id = insert_table_entity.restaurant_id;

        let row = conn.transaction::<Option<TableEntity>, diesel::result::Error, _>(|conn| {
            // Serializes concurrent creates for the same restaurant.
            restaurants::table
                .find(restaurant_id)
                .select(restaurants::id)
                .for_update()
                .first::<Uuid>(conn)?;

            let current = dining_tables::table
                .filter(dining_tables::restaurant_id.eq(restaurant_id))
                .count()
                .get_result::<i64>(conn)?;
            if current >= max_tables {
                return Ok(None);
            }

            insert_into(dining_tables::table)
                .values(&insert_table_entity)
                .returning(TableEntity::as_returning())
                .get_result::<TableEntity>(conn)
                .map(Some)
        })?;

        Ok(row)
    }

    async fn find_by_id(&self, table_id: Uuid) -> Result<Option<TableEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = dining_tables::table
            .find(table_id)
            .select(TableEntity::as_select())
            .first::<TableEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn find_by_number(
        &self,
        restaurant_id: Uuid,
        table_number: &str,
    ) -> Result<Option<TableEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = dining_tables::table
            .filter(dining_tables::restaurant_id.eq(restaurant_id))
            .filter(dining_tables::table_number.eq(table_number))
            .select(TableEntity::as_select())
            .first::<TableEntity>(&mut conn)
            .optional()?;

        Ok(row)
    }

    async fn list_by_restaurant(&self, restaurant_id: Uuid) -> Result<Vec<TableEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = dining_tables::table
            .filter(dining_tables::restaurant_id.eq(restaurant_id))
            .order(dining_tables::table_number.asc())
            .select(TableEntity::as_select())
            .load::<TableEntity>(&mut conn)?;

        Ok(rows)
    }

    async fn update(
        &self,
        table_id: Uuid,
        update_table_entity: UpdateTableEntity,
    ) -> Result<TableEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(dining_tables::table.find(table_id))
            .set(&update_table_entity)
            .returning(TableEntity::as_returning())
            .get_result::<TableEntity>(&mut conn)?;

        Ok(row)
    }

    async fn set_active(&self, table_id: Uuid, is_active: bool) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(dining_tables::table.find(table_id))
            .set((
                dining_tables::is_active.eq(is_active),
                dining_tables::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
