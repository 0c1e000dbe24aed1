use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::restaurants::RestaurantEntity,
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRestaurantModel {
    pub owner_id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub google_review_url: Option<String>,
    pub google_business_url: Option<String>,
    pub google_place_id: Option<String>,
    pub notification_email: Option<String>,
    pub trial_days: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRestaurantModel {
    pub name: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub google_review_url: Option<String>,
    pub google_business_url: Option<String>,
    pub google_place_id: Option<String>,
    pub notification_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RestaurantDto {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub google_review_url: Option<String>,
    pub google_business_url: Option<String>,
    pub google_place_id: Option<String>,
    pub notification_email: Option<String>,
    pub last_review_count: Option<i32>,
    pub last_review_check_at: Option<DateTime<Utc>>,
}

impl From<RestaurantEntity> for RestaurantDto {
    fn from(value: RestaurantEntity) -> Self {
        Self {
            subscription_status: value.subscription_status(),
            id: value.id,
            owner_id: value.owner_id,
            name: value.name,
            slug: value.slug,
            city: value.city,
            address: value.address,
            is_active: value.is_active,
            subscription_expires_at: value.subscription_expires_at,
            google_review_url: value.google_review_url,
            google_business_url: value.google_business_url,
            google_place_id: value.google_place_id,
            notification_email: value.notification_email,
            last_review_count: value.last_review_count,
            last_review_check_at: value.last_review_check_at,
        }
    }
}

pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
