use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{plans::PlanEntity, subscriptions::SubscriptionEntity},
    value_objects::{enums::subscription_statuses::SubscriptionStatus, plans::PlanFeatures},
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionModel {
    pub plan_id: Uuid,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrentSubscriptionDto {
    pub subscription_id: Option<Uuid>,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub features: PlanFeatures,
}

impl CurrentSubscriptionDto {
    pub fn new(
        subscription: Option<&SubscriptionEntity>,
        plan: PlanEntity,
        restaurant_status: SubscriptionStatus,
    ) -> Self {
        Self {
            subscription_id: subscription.map(|s| s.id),
            plan_id: plan.id,
            plan_name: plan.name,
            status: subscription
                .map(SubscriptionEntity::status)
                .unwrap_or(restaurant_status),
            starts_at: subscription.map(|s| s.starts_at),
            ends_at: subscription.map(|s| s.ends_at),
            features: plan.features,
        }
    }
}
