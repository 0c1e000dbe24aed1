pub mod activity;
pub mod plan_resolver;
pub mod plans;
pub mod qr_codes;
pub mod restaurants;
pub mod scan_recorder;
pub mod scan_resolver;
pub mod subscriptions;
pub mod tables;

use axum::http::StatusCode;
use crates::domain::{
    entities::restaurants::RestaurantEntity, repositories::restaurants::RestaurantRepository,
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::auth::AuthUser;

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    Conflict(String),
    #[error("plan limit reached: {0}")]
    QuotaExceeded(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UseCaseError::Forbidden => StatusCode::FORBIDDEN,
            UseCaseError::Conflict(_) => StatusCode::CONFLICT,
            UseCaseError::QuotaExceeded(_) => StatusCode::PAYMENT_REQUIRED,
            UseCaseError::BadRequest(_) => StatusCode::BAD_REQUEST,
            UseCaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UseCaseError>;

pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    )
}

pub(crate) async fn managed_restaurant<R>(
    restaurant_repo: &R,
    auth: &AuthUser,
    restaurant_id: Uuid,
) -> UseCaseResult<RestaurantEntity>
where
    R: RestaurantRepository + Send + Sync + ?Sized,
{
    let restaurant = restaurant_repo
        .find_by_id(restaurant_id)
        .await?
        .ok_or(UseCaseError::NotFound("restaurant"))?;

    if !auth.can_manage(&restaurant) {
        warn!(
            user_id = %auth.user_id,
            %restaurant_id,
            "auth: restaurant access denied"
        );
        return Err(UseCaseError::Forbidden);
    }

    Ok(restaurant)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, Utc};
    use crates::domain::{
        entities::{
            plans::PlanEntity, qr_codes::QrCodeEntity, restaurants::RestaurantEntity,
            tables::TableEntity,
        },
        value_objects::{enums::subscription_statuses::SubscriptionStatus, plans::PlanFeatures},
    };
    use uuid::Uuid;

    use crate::auth::AuthUser;
    use crates::domain::value_objects::enums::user_roles::UserRole;

    pub(crate) fn owner(user_id: Uuid) -> AuthUser {
        AuthUser {
            user_id,
            role: UserRole::Owner,
        }
    }

    pub(crate) fn admin() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Admin,
        }
    }

    pub(crate) fn restaurant(owner_id: Uuid) -> RestaurantEntity {
        let now = Utc::now();
        RestaurantEntity {
            id: Uuid::new_v4(),
            owner_id,
            name: "Pho 99".to_string(),
            slug: "pho-99".to_string(),
            city: Some("Hanoi".to_string()),
            address: Some("12 Hang Bac".to_string()),
            is_active: true,
            subscription_status: SubscriptionStatus::Active.to_string(),
            subscription_expires_at: Some(now + Duration::days(20)),
            google_review_url: Some("https://g.page/r/pho99/review".to_string()),
            google_business_url: None,
            google_place_id: Some("ChIJ123".to_string()),
            notification_email: Some("owner@example.com".to_string()),
            last_review_count: Some(42),
            last_review_check_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn table(restaurant_id: Uuid, number: &str) -> TableEntity {
        let now = Utc::now();
        TableEntity {
            id: Uuid::new_v4(),
            restaurant_id,
            table_number: number.to_string(),
            label: None,
            is_active: true,
            scan_count: 0,
            last_scan_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn qr_code(table: &TableEntity, code: &str) -> QrCodeEntity {
        let now = Utc::now();
        QrCodeEntity {
            id: Uuid::new_v4(),
            table_id: table.id,
            restaurant_id: table.restaurant_id,
            code: code.to_string(),
            is_active: true,
            scan_count: 0,
            last_scan_at: None,
            redirect_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn plan(id: Uuid, max_tables: Option<i64>) -> PlanEntity {
        PlanEntity {
            id,
            name: "Plan".to_string(),
            price_minor: 1900,
            duration_days: 30,
            features: PlanFeatures {
                max_tables,
                ..PlanFeatures::default()
            },
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
