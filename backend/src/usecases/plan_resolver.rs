use anyhow::Result;
use crates::domain::{
    entities::{plans::PlanEntity, subscriptions::SubscriptionEntity},
    repositories::{plans::PlanRepository, subscriptions::SubscriptionRepository},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub struct PlanResolver<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    trial_plan_id: Uuid,
}

impl<P, S> PlanResolver<P, S>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(plan_repo: Arc<P>, subscription_repo: Arc<S>, trial_plan_id: Uuid) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            trial_plan_id,
        }
    }

    pub async fn resolve_for_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<(PlanEntity, Option<SubscriptionEntity>)> {
        if let Some(subscription) = self
            .subscription_repo
            .find_current_active(restaurant_id)
            .await?
        {
            debug!(
                %restaurant_id,
                plan_id = %subscription.plan_id,
                "plan_resolver: using active subscription plan"
            );
            let plan = self.plan_repo.find_by_id(subscription.plan_id).await?;
            return Ok((plan, Some(subscription)));
        }

        debug!(%restaurant_id, "plan_resolver: falling back to trial plan");
        let plan = self.plan_repo.find_by_id(self.trial_plan_id).await?;
        Ok((plan, None))
    }

    pub async fn effective_plan(&self, restaurant_id: Uuid) -> Result<PlanEntity> {
        Ok(self.resolve_for_restaurant(restaurant_id).await?.0)
    }
}
