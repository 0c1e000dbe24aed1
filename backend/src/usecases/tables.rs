use chrono::Utc;
use crates::domain::{
    entities::tables::{InsertTableEntity, TableEntity, UpdateTableEntity},
    repositories::{
        plans::PlanRepository, restaurants::RestaurantRepository,
        subscriptions::SubscriptionRepository, tables::TableRepository,
    },
    value_objects::{
        restaurants::non_blank,
        tables::{CreateTableModel, TableDto, UpdateTableModel, normalize_table_number},
    },
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    UseCaseError, UseCaseResult, is_unique_violation, managed_restaurant,
    plan_resolver::PlanResolver,
};
use crate::auth::AuthUser;

pub struct TableUseCase<R, T, P, S>
where
    R: RestaurantRepository + Send + Sync + 'static,
    T: TableRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    restaurant_repo: Arc<R>,
    table_repo: Arc<T>,
    plan_resolver: PlanResolver<P, S>,
}

impl<R, T, P, S> TableUseCase<R, T, P, S>
where
    R: RestaurantRepository + Send + Sync + 'static,
    T: TableRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(
        restaurant_repo: Arc<R>,
        table_repo: Arc<T>,
        plan_resolver: PlanResolver<P, S>,
    ) -> Self {
        Self {
            restaurant_repo,
            table_repo,
            plan_resolver,
        }
    }

    pub async fn create(
        &self,
        auth: &AuthUser,
        restaurant_id: Uuid,
        model: CreateTableModel,
    ) -> UseCaseResult<TableDto> {
        let restaurant =
            managed_restaurant(self.restaurant_repo.as_ref(), auth, restaurant_id).await?;
        if !restaurant.is_active {
            return Err(UseCaseError::BadRequest(
                "restaurant is deactivated".to_string(),
            ));
        }

        let table_number = normalize_table_number(&model.table_number);
        if table_number.is_empty() {
            return Err(UseCaseError::BadRequest(
                "table_number is required".to_string(),
            ));
        }

        self.ensure_number_free(restaurant_id, &table_number).await?;

        let plan = self.plan_resolver.effective_plan(restaurant_id).await?;
        let max_tables = plan.features.max_tables_or_default();

        let now = Utc::now();
        let created = self
            .table_repo
            .create_within_quota(
                InsertTableEntity {
                    restaurant_id,
                    table_number: table_number.clone(),
                    label: non_blank(model.label),
                    is_active: true,
                    scan_count: 0,
                    created_at: now,
                    updated_at: now,
                },
                max_tables,
            )
            .await
            .map_err(|err| number_conflict(err, &table_number))?;

        let Some(table) = created else {
            warn!(
                %restaurant_id,
                plan_id = %plan.id,
                max_tables,
                "tables: plan limit reached"
            );
            return Err(UseCaseError::QuotaExceeded(format!(
                "plan '{}' allows {} tables",
                plan.name, max_tables
            )));
        };

        info!(%restaurant_id, table_id = %table.id, %table_number, "tables: created");

        Ok(table.into())
    }

    pub async fn list(&self, auth: &AuthUser, restaurant_id: Uuid) -> UseCaseResult<Vec<TableDto>> {
        managed_restaurant(self.restaurant_repo.as_ref(), auth, restaurant_id).await?;

        let tables = self.table_repo.list_by_restaurant(restaurant_id).await?;
        Ok(tables.into_iter().map(TableDto::from).collect())
    }

    pub async fn update(
        &self,
        auth: &AuthUser,
        table_id: Uuid,
        model: UpdateTableModel,
    ) -> UseCaseResult<TableDto> {
        let table = self.managed_table(auth, table_id).await?;

        let table_number = match model.table_number.as_deref().map(normalize_table_number) {
            Some(number) if number.is_empty() => {
                return Err(UseCaseError::BadRequest(
                    "table_number cannot be blank".to_string(),
                ));
            }
            Some(number) if number == table.table_number => None,
            other => other,
        };

        if let Some(number) = &table_number {
            self.ensure_number_free(table.restaurant_id, number).await?;
        }

        let changeset = UpdateTableEntity {
            table_number: table_number.clone(),
            label: model.label.map(|v| non_blank(Some(v))),
            updated_at: Some(Utc::now()),
        };

        if changeset.table_number.is_none() && changeset.label.is_none() {
            return Ok(table.into());
        }

        let updated = self
            .table_repo
            .update(table_id, changeset)
            .await
            .map_err(|err| match &table_number {
                Some(number) => number_conflict(err, number),
                None => UseCaseError::Internal(err),
            })?;

        Ok(updated.into())
    }

    pub async fn set_active(
        &self,
        auth: &AuthUser,
        table_id: Uuid,
        is_active: bool,
    ) -> UseCaseResult<TableDto> {
        let mut table = self.managed_table(auth, table_id).await?;

        if is_active {
            let restaurant = self
                .restaurant_repo
                .find_by_id(table.restaurant_id)
                .await?
                .ok_or(UseCaseError::NotFound("restaurant"))?;
            if !restaurant.is_active {
                return Err(UseCaseError::BadRequest(
                    "restaurant is deactivated".to_string(),
                ));
            }
        }

        self.table_repo.set_active(table_id, is_active).await?;
        info!(%table_id, is_active, "tables: activation changed");

        table.is_active = is_active;
        Ok(table.into())
    }

    async fn managed_table(&self, auth: &AuthUser, table_id: Uuid) -> UseCaseResult<TableEntity> {
        let table = self
            .table_repo
            .find_by_id(table_id)
            .await?
            .ok_or(UseCaseError::NotFound("table"))?;

        managed_restaurant(self.restaurant_repo.as_ref(), auth, table.restaurant_id).await?;

        Ok(table)
    }

    async fn ensure_number_free(&self, restaurant_id: Uuid, table_number: &str) -> UseCaseResult<()> {
        if self
            .table_repo
            .find_by_number(restaurant_id, table_number)
            .await?
            .is_some()
        {
            return Err(UseCaseError::Conflict(format!(
                "table '{table_number}' already exists"
            )));
        }
        Ok(())
    }
}

fn number_conflict(err: anyhow::Error, table_number: &str) -> UseCaseError {
    if is_unique_violation(&err) {
        UseCaseError::Conflict(format!("table '{table_number}' already exists"))
    } else {
        UseCaseError::Internal(err)
    }
}
