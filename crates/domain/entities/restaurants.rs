use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::subscription_statuses::SubscriptionStatus,
    infra::db::postgres::schema::restaurants,
};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = restaurants)]
pub struct RestaurantEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub subscription_status: String,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub google_review_url: Option<String>,
    pub google_business_url: Option<String>,
    pub google_place_id: Option<String>,
    pub notification_email: Option<String>,
    pub last_review_count: Option<i32>,
    pub last_review_check_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RestaurantEntity {
    pub fn subscription_status(&self) -> SubscriptionStatus {
        SubscriptionStatus::from_str(&self.subscription_status)
    }

    pub fn subscription_is_servable(&self, now: DateTime<Utc>) -> bool {
        if !self.subscription_status().is_servable() {
            return false;
        }

        match self.subscription_expires_at {
            Some(expires_at) => expires_at > now,
            None => true,
        }
    }

    pub fn place_id(&self) -> Option<&str> {
        self.google_place_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = restaurants)]
pub struct InsertRestaurantEntity {
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub subscription_status: String,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub google_review_url: Option<String>,
    pub google_business_url: Option<String>,
    pub google_place_id: Option<String>,
    pub notification_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `Some(None)` clears a nullable column, `None` leaves it untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = restaurants)]
pub struct UpdateRestaurantEntity {
    pub name: Option<String>,
    pub city: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub google_review_url: Option<Option<String>>,
    pub google_business_url: Option<Option<String>>,
    pub google_place_id: Option<Option<String>>,
    pub notification_email: Option<Option<String>>,
    pub last_review_count: Option<Option<i32>>,
    pub last_review_check_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UpdateRestaurantEntity {
    pub fn touches_redirect_config(&self) -> bool {
        self.google_review_url.is_some()
            || self.google_business_url.is_some()
            || self.google_place_id.is_some()
            || self.name.is_some()
            || self.city.is_some()
            || self.address.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.city.is_none()
            && self.address.is_none()
            && self.google_review_url.is_none()
            && self.google_business_url.is_none()
            && self.google_place_id.is_none()
            && self.notification_email.is_none()
    }
}
