use anyhow::Context;
use chrono::Utc;
use crates::domain::{
    entities::plans::InsertPlanEntity,
    repositories::plans::PlanRepository,
    value_objects::plans::{CreatePlanModel, PlanDto},
};
use std::sync::Arc;
use tracing::info;

use super::{UseCaseError, UseCaseResult};
use crate::auth::AuthUser;

pub struct PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
}

impl<P> PlanUseCase<P>
where
    P: PlanRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>) -> Self {
        Self { plan_repo }
    }

    pub async fn list_active(&self) -> UseCaseResult<Vec<PlanDto>> {
        let plans = self.plan_repo.list_active_plans().await?;
        Ok(plans.into_iter().map(PlanDto::from).collect())
    }

    pub async fn create(&self, auth: &AuthUser, model: CreatePlanModel) -> UseCaseResult<PlanDto> {
        if !auth.is_admin() {
            return Err(UseCaseError::Forbidden);
        }

        let name = model.name.trim().to_string();
        if name.is_empty() {
            return Err(UseCaseError::BadRequest("name is required".to_string()));
        }
        if model.price_minor < 0 {
            return Err(UseCaseError::BadRequest(
                "price_minor cannot be negative".to_string(),
            ));
        }
        if model.duration_days <= 0 {
            return Err(UseCaseError::BadRequest(
                "duration_days must be positive".to_string(),
            ));
        }

        let features =
            serde_json::to_value(&model.features).context("failed to encode plan features")?;

        let plan = self
            .plan_repo
            .create(InsertPlanEntity {
                name,
                price_minor: model.price_minor,
                duration_days: model.duration_days,
                features,
                is_active: true,
                created_at: Utc::now(),
            })
            .await?;

        info!(plan_id = %plan.id, name = %plan.name, "plans: created");

        Ok(plan.into())
    }
}
