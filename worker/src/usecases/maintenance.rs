use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use crates::domain::repositories::{
    restaurants::RestaurantRepository, review_checks::ReviewCheckRepository,
    scan_cooldowns::ScanCooldownStore, subscriptions::SubscriptionRepository,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub expired_restaurants: usize,
    pub swept_cooldowns: usize,
    pub released_locks: usize,
}

pub struct MaintenanceUseCase {
    restaurant_repo: Arc<dyn RestaurantRepository + Send + Sync>,
    subscription_repo: Arc<dyn SubscriptionRepository + Send + Sync>,
    cooldown_store: Arc<dyn ScanCooldownStore + Send + Sync>,
    review_check_repo: Arc<dyn ReviewCheckRepository + Send + Sync>,
    cooldown_window: Duration,
    stale_lock_after: Duration,
}

impl MaintenanceUseCase {
    pub fn new(
        restaurant_repo: Arc<dyn RestaurantRepository + Send + Sync>,
        subscription_repo: Arc<dyn SubscriptionRepository + Send + Sync>,
        cooldown_store: Arc<dyn ScanCooldownStore + Send + Sync>,
        review_check_repo: Arc<dyn ReviewCheckRepository + Send + Sync>,
        cooldown_window: Duration,
        stale_lock_after: Duration,
    ) -> Self {
        Self {
            restaurant_repo,
            subscription_repo,
            cooldown_store,
            review_check_repo,
            cooldown_window,
            stale_lock_after,
        }
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<MaintenanceReport> {
        let expired_restaurants = self.expire_lapsed_subscriptions(now).await?;
        let swept_cooldowns = self.cooldown_store.sweep(now - self.cooldown_window).await?;
        let released_locks = self
            .review_check_repo
            .release_stale_locks(now - self.stale_lock_after)
            .await?;

        let report = MaintenanceReport {
            expired_restaurants,
            swept_cooldowns,
            released_locks,
        };
        info!(?report, "maintenance: pass finished");
        Ok(report)
    }

    async fn expire_lapsed_subscriptions(&self, now: DateTime<Utc>) -> Result<usize> {
        let lapsed = self.restaurant_repo.list_lapsed_subscriptions(now).await?;

        let mut expired = 0;
        for restaurant in lapsed {
            match self
                .subscription_repo
                .expire_restaurant(restaurant.id, now)
                .await
            {
                Ok(()) => {
                    expired += 1;
                    info!(restaurant_id = %restaurant.id, "maintenance: subscription expired");
                }
                Err(err) => error!(
                    restaurant_id = %restaurant.id,
                    error = %err,
                    "maintenance: failed to expire subscription"
                ),
            }
        }

        Ok(expired)
    }
}
