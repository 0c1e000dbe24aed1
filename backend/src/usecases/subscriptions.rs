use chrono::{Duration, Utc};
use crates::domain::{
    repositories::{
        plans::PlanRepository, restaurants::RestaurantRepository,
        subscriptions::SubscriptionRepository,
    },
    value_objects::{
        plans::TRIAL_PLAN_ID,
        subscriptions::{CreateSubscriptionModel, CurrentSubscriptionDto},
    },
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{UseCaseError, UseCaseResult, managed_restaurant, plan_resolver::PlanResolver};
use crate::auth::AuthUser;

pub struct SubscriptionUseCase<R, P, S>
where
    R: RestaurantRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    restaurant_repo: Arc<R>,
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    plan_resolver: PlanResolver<P, S>,
}

impl<R, P, S> SubscriptionUseCase<R, P, S>
where
    R: RestaurantRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(restaurant_repo: Arc<R>, plan_repo: Arc<P>, subscription_repo: Arc<S>) -> Self {
        let plan_resolver = PlanResolver::new(
            Arc::clone(&plan_repo),
            Arc::clone(&subscription_repo),
            TRIAL_PLAN_ID,
        );

        Self {
            restaurant_repo,
            plan_repo,
            subscription_repo,
            plan_resolver,
        }
    }

    pub async fn current(
        &self,
        auth: &AuthUser,
        restaurant_id: Uuid,
    ) -> UseCaseResult<CurrentSubscriptionDto> {
        let restaurant =
            managed_restaurant(self.restaurant_repo.as_ref(), auth, restaurant_id).await?;

        let (plan, subscription) = self
            .plan_resolver
            .resolve_for_restaurant(restaurant_id)
            .await?;

        Ok(CurrentSubscriptionDto::new(
            subscription.as_ref(),
            plan,
            restaurant.subscription_status(),
        ))
    }

    pub async fn subscribe(
        &self,
        auth: &AuthUser,
        restaurant_id: Uuid,
        model: CreateSubscriptionModel,
    ) -> UseCaseResult<CurrentSubscriptionDto> {
        if !auth.is_admin() {
            return Err(UseCaseError::Forbidden);
        }

        self.restaurant_repo
            .find_by_id(restaurant_id)
            .await?
            .ok_or(UseCaseError::NotFound("restaurant"))?;

        if model.plan_id == TRIAL_PLAN_ID {
            return Err(UseCaseError::BadRequest(
                "the trial plan cannot be subscribed to".to_string(),
            ));
        }

        let plan = self
            .plan_repo
            .find_active_plan_by_id(model.plan_id)
            .await?
            .ok_or(UseCaseError::NotFound("plan"))?;

        let starts_at = Utc::now();
        let ends_at = starts_at + Duration::days(i64::from(plan.duration_days));

        let subscription = self
            .subscription_repo
            .replace_active_subscription(restaurant_id, plan.id, starts_at, ends_at)
            .await?;

        info!(
            %restaurant_id,
            plan_id = %plan.id,
            subscription_id = %subscription.id,
            %ends_at,
            "subscriptions: activated"
        );

        let status = subscription.status();
        Ok(CurrentSubscriptionDto::new(Some(&subscription), plan, status))
    }

    pub async fn cancel(&self, auth: &AuthUser, restaurant_id: Uuid) -> UseCaseResult<()> {
        managed_restaurant(self.restaurant_repo.as_ref(), auth, restaurant_id).await?;

        let cancelled = self
            .subscription_repo
            .cancel_active(restaurant_id)
            .await?
            .ok_or(UseCaseError::NotFound("active subscription"))?;

        warn!(
            %restaurant_id,
            subscription_id = %cancelled.id,
            user_id = %auth.user_id,
            "subscriptions: cancelled"
        );

        Ok(())
    }
}
