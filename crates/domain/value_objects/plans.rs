use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::plans::PlanEntity;

pub const TRIAL_PLAN_ID: Uuid = Uuid::nil();

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PlanFeatures {
    #[serde(default)]
    pub max_tables: Option<i64>,

    #[serde(default)]
    pub max_scans_per_month: Option<i64>,

    #[serde(default)]
    pub max_users: Option<i64>,

    #[serde(default)]
    pub feature_list: Vec<String>,
}

impl PlanFeatures {
    pub fn max_tables_or_default(&self) -> i64 {
        self.max_tables.unwrap_or(0)
    }

    pub fn max_scans_per_month_or_default(&self) -> i64 {
        self.max_scans_per_month.unwrap_or(0)
    }

    pub fn max_users_or_default(&self) -> i64 {
        self.max_users.unwrap_or(1)
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.feature_list.iter().any(|f| f == feature)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanModel {
    pub name: String,
    pub price_minor: i32,
    pub duration_days: i32,
    #[serde(default)]
    pub features: PlanFeatures,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanDto {
    pub id: Uuid,
    pub name: String,
    pub price_minor: i32,
    pub duration_days: i32,
    pub features: PlanFeatures,
}

impl From<PlanEntity> for PlanDto {
    fn from(value: PlanEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            price_minor: value.price_minor,
            duration_days: value.duration_days,
            features: value.features,
        }
    }
}
