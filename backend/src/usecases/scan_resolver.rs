use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use crates::domain::{
    entities::{qr_codes::QrCodeEntity, restaurants::RestaurantEntity, tables::TableEntity},
    repositories::{
        qr_codes::QrCodeRepository, restaurants::RestaurantRepository, tables::TableRepository,
    },
    value_objects::{
        qr_codes::normalize_code,
        redirects::{RedirectTarget, select_redirect},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan code is invalid")]
    CodeInvalid,
    #[error("scan data is inconsistent")]
    DataInconsistent,
    #[error("restaurant is inactive")]
    RestaurantInactive,
    #[error("subscription is inactive")]
    SubscriptionInactive,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ScanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::CodeInvalid => StatusCode::NOT_FOUND,
            ScanError::RestaurantInactive | ScanError::SubscriptionInactive => {
                StatusCode::FORBIDDEN
            }
            ScanError::DataInconsistent | ScanError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ScanError::CodeInvalid => "CODE_INVALID",
            ScanError::DataInconsistent => "DATA_INCONSISTENT",
            ScanError::RestaurantInactive => "RESTAURANT_INACTIVE",
            ScanError::SubscriptionInactive => "SUBSCRIPTION_INACTIVE",
            ScanError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            ScanError::CodeInvalid => "This QR code is not valid.",
            ScanError::RestaurantInactive => "This restaurant is not accepting reviews right now.",
            ScanError::SubscriptionInactive => "This QR code is temporarily unavailable.",
            ScanError::DataInconsistent | ScanError::Internal(_) => {
                "Something went wrong. Please try again later."
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedScan {
    pub qr_code: QrCodeEntity,
    pub table: TableEntity,
    pub restaurant: RestaurantEntity,
    pub redirect: RedirectTarget,
}

pub struct ScanResolver {
    qr_code_repo: Arc<dyn QrCodeRepository + Send + Sync>,
    table_repo: Arc<dyn TableRepository + Send + Sync>,
    restaurant_repo: Arc<dyn RestaurantRepository + Send + Sync>,
}

impl ScanResolver {
    pub fn new(
        qr_code_repo: Arc<dyn QrCodeRepository + Send + Sync>,
        table_repo: Arc<dyn TableRepository + Send + Sync>,
        restaurant_repo: Arc<dyn RestaurantRepository + Send + Sync>,
    ) -> Self {
        Self {
            qr_code_repo,
            table_repo,
            restaurant_repo,
        }
    }

    pub async fn resolve(&self, raw_code: &str, now: DateTime<Utc>) -> Result<ResolvedScan, ScanError> {
        let code = normalize_code(raw_code);
        if code.is_empty() {
            return Err(ScanError::CodeInvalid);
        }

        let qr_code = self
            .qr_code_repo
            .find_by_code(&code)
            .await
            .map_err(|err| {
                error!(%code, db_error = ?err, "scan: qr code lookup failed");
                ScanError::Internal(err)
            })?
            .ok_or_else(|| {
                info!(%code, "scan: unknown code");
                ScanError::CodeInvalid
            })?;

        let table = self
            .table_repo
            .find_by_id(qr_code.table_id)
            .await
            .map_err(|err| {
                error!(%code, table_id = %qr_code.table_id, db_error = ?err, "scan: table lookup failed");
                ScanError::Internal(err)
            })?;

        let restaurant = self
            .restaurant_repo
            .find_by_id(qr_code.restaurant_id)
            .await
            .map_err(|err| {
                error!(
                    %code,
                    restaurant_id = %qr_code.restaurant_id,
                    db_error = ?err,
                    "scan: restaurant lookup failed"
                );
                ScanError::Internal(err)
            })?;

        let (Some(table), Some(restaurant)) = (table, restaurant) else {
            error!(
                %code,
                qr_code_id = %qr_code.id,
                "scan: qr code points at a missing table or restaurant"
            );
            return Err(ScanError::DataInconsistent);
        };

        if !restaurant.is_active {
            warn!(%code, restaurant_id = %restaurant.id, "scan: restaurant inactive");
            return Err(ScanError::RestaurantInactive);
        }

        if !qr_code.is_active || !table.is_active {
            info!(
                %code,
                qr_active = qr_code.is_active,
                table_active = table.is_active,
                "scan: code or table inactive"
            );
            return Err(ScanError::CodeInvalid);
        }

        if !restaurant.subscription_is_servable(now) {
            warn!(
                %code,
                restaurant_id = %restaurant.id,
                subscription_status = %restaurant.subscription_status,
                "scan: subscription not servable"
            );
            return Err(ScanError::SubscriptionInactive);
        }

        let redirect = select_redirect(&restaurant);
        info!(
            %code,
            restaurant_id = %restaurant.id,
            table_id = %table.id,
            source = ?redirect.source,
            "scan: resolved"
        );

        Ok(ResolvedScan {
            qr_code,
            table,
            restaurant,
            redirect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::fixtures::{qr_code, restaurant, table};
    use chrono::Duration;
    use crates::domain::{
        repositories::{
            qr_codes::MockQrCodeRepository, restaurants::MockRestaurantRepository,
            tables::MockTableRepository,
        },
        value_objects::{
            enums::subscription_statuses::SubscriptionStatus, redirects::RedirectSource,
        },
    };
    use uuid::Uuid;

    struct World {
        restaurant: Option<RestaurantEntity>,
        table: Option<TableEntity>,
        qr_code: Option<QrCodeEntity>,
    }

    impl World {
        fn healthy() -> Self {
            let restaurant = restaurant(Uuid::new_v4());
            let table = table(restaurant.id, "T1");
            let qr_code = qr_code(&table, "AB23CD45EF");
            Self {
                restaurant: Some(restaurant),
                table: Some(table),
                qr_code: Some(qr_code),
            }
        }

        fn resolver(&self) -> ScanResolver {
            let mut qr_repo = MockQrCodeRepository::new();
            let mut table_repo = MockTableRepository::new();
            let mut restaurant_repo = MockRestaurantRepository::new();

            let qr_code = self.qr_code.clone();
            qr_repo.expect_find_by_code().returning(move |code| {
                Ok(qr_code.clone().filter(|qr| qr.code == code))
            });
            let table = self.table.clone();
            table_repo
                .expect_find_by_id()
                .returning(move |_| Ok(table.clone()));
            let restaurant = self.restaurant.clone();
            restaurant_repo
                .expect_find_by_id()
                .returning(move |_| Ok(restaurant.clone()));

            ScanResolver::new(
                Arc::new(qr_repo),
                Arc::new(table_repo),
                Arc::new(restaurant_repo),
            )
        }
    }

    #[tokio::test]
    async fn review_url_is_used_after_normalization() {
        let mut world = World::healthy();
        world.restaurant.as_mut().unwrap().google_review_url =
            Some("g.page/r/pho99/review".to_string());

        let resolved = world.resolver().resolve("AB23CD45EF", Utc::now()).await.unwrap();

        assert_eq!(resolved.redirect.url, "https://g.page/r/pho99/review");
        assert_eq!(resolved.redirect.source, RedirectSource::ReviewUrl);
    }

    #[tokio::test]
    async fn lowercase_code_with_whitespace_resolves() {
        let world = World::healthy();

        let resolved = world.resolver().resolve("  ab23cd45ef ", Utc::now()).await.unwrap();

        assert_eq!(resolved.qr_code.code, "AB23CD45EF");
    }

    #[tokio::test]
    async fn business_url_is_used_when_review_url_missing() {
        let mut world = World::healthy();
        {
            let restaurant = world.restaurant.as_mut().unwrap();
            restaurant.google_review_url = None;
            restaurant.google_business_url = Some("maps.google.com/?cid=1".to_string());
        }

        let resolved = world.resolver().resolve("AB23CD45EF", Utc::now()).await.unwrap();

        assert_eq!(resolved.redirect.url, "https://maps.google.com/?cid=1");
        assert_eq!(resolved.redirect.source, RedirectSource::BusinessUrl);
    }

    #[tokio::test]
    async fn unknown_code_is_invalid() {
        let world = World::healthy();

        let err = world.resolver().resolve("ZZZZZZZZZZ", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::CodeInvalid));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_code_is_invalid_without_lookup() {
        let resolver = ScanResolver::new(
            Arc::new(MockQrCodeRepository::new()),
            Arc::new(MockTableRepository::new()),
            Arc::new(MockRestaurantRepository::new()),
        );

        let err = resolver.resolve("   ", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::CodeInvalid));
    }

    #[tokio::test]
    async fn deactivated_restaurant_wins_over_inactive_code() {
        let mut world = World::healthy();
        world.restaurant.as_mut().unwrap().is_active = false;
        world.table.as_mut().unwrap().is_active = false;
        world.qr_code.as_mut().unwrap().is_active = false;

        let err = world.resolver().resolve("AB23CD45EF", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::RestaurantInactive));
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn deactivated_restaurant_with_active_code() {
        let mut world = World::healthy();
        world.restaurant.as_mut().unwrap().is_active = false;

        let err = world.resolver().resolve("AB23CD45EF", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::RestaurantInactive));
    }

    #[tokio::test]
    async fn inactive_code_is_invalid() {
        let mut world = World::healthy();
        world.qr_code.as_mut().unwrap().is_active = false;

        let err = world.resolver().resolve("AB23CD45EF", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::CodeInvalid));
    }

    #[tokio::test]
    async fn inactive_table_is_invalid() {
        let mut world = World::healthy();
        world.table.as_mut().unwrap().is_active = false;

        let err = world.resolver().resolve("AB23CD45EF", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::CodeInvalid));
    }

    #[tokio::test]
    async fn missing_table_is_inconsistent() {
        let mut world = World::healthy();
        world.table = None;

        let err = world.resolver().resolve("AB23CD45EF", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::DataInconsistent));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn cancelled_subscription_blocks_scan() {
        let mut world = World::healthy();
        world.restaurant.as_mut().unwrap().subscription_status =
            SubscriptionStatus::Cancelled.to_string();

        let err = world.resolver().resolve("AB23CD45EF", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::SubscriptionInactive));
    }

    #[tokio::test]
    async fn lapsed_trial_blocks_scan() {
        let mut world = World::healthy();
        {
            let restaurant = world.restaurant.as_mut().unwrap();
            restaurant.subscription_status = SubscriptionStatus::Trial.to_string();
            restaurant.subscription_expires_at = Some(Utc::now() - Duration::hours(1));
        }

        let err = world.resolver().resolve("AB23CD45EF", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::SubscriptionInactive));
    }

    #[tokio::test]
    async fn database_failure_is_internal() {
        let mut qr_repo = MockQrCodeRepository::new();
        qr_repo
            .expect_find_by_code()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let resolver = ScanResolver::new(
            Arc::new(qr_repo),
            Arc::new(MockTableRepository::new()),
            Arc::new(MockRestaurantRepository::new()),
        );

        let err = resolver.resolve("AB23CD45EF", Utc::now()).await.unwrap_err();

        assert!(matches!(err, ScanError::Internal(_)));
        assert!(!err.public_message().contains("connection"));
    }
}
