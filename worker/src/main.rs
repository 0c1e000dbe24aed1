use anyhow::Result;
use crates::domain::{
    repositories::{
        notifications::NotificationDispatcher, restaurants::RestaurantRepository,
        review_checks::ReviewCheckRepository, scans::ScanRepository,
    },
    value_objects::review_checks::ReviewCheckSchedule,
};
use crates::infra::{
    db::{
        postgres::postgres_connection,
        repositories::{
            restaurants::RestaurantPostgres, review_checks::ReviewCheckPostgres,
            review_notifications::ReviewNotificationPostgres,
            scan_cooldowns::ScanCooldownPostgres, scans::ScanPostgres,
            subscriptions::SubscriptionPostgres,
        },
    },
    notifications::{email_api::EmailApiDispatcher, log_only::LogOnlyDispatcher},
    reviews::google_places::GooglePlacesClient,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{
    axum_http, config, maintenance, review_checking,
    usecases::{
        maintenance::MaintenanceUseCase,
        review_attribution::{AttributionSettings, ReviewAttributionUseCase},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_pool_size,
    )?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let review_check_repository: Arc<dyn ReviewCheckRepository + Send + Sync> =
        Arc::new(ReviewCheckPostgres::new(Arc::clone(&db_pool_arc)));
    let restaurant_repository: Arc<dyn RestaurantRepository + Send + Sync> =
        Arc::new(RestaurantPostgres::new(Arc::clone(&db_pool_arc)));
    let scan_repository: Arc<dyn ScanRepository + Send + Sync> =
        Arc::new(ScanPostgres::new(Arc::clone(&db_pool_arc)));

    let places = &dotenvy_env.google_places;
    let reviews_api = Arc::new(GooglePlacesClient::new(
        &places.base_url,
        &places.api_key,
        Duration::from_secs(places.timeout_seconds),
    )?);

    let dispatcher: Arc<dyn NotificationDispatcher + Send + Sync> = match &dotenvy_env.email {
        Some(email) => Arc::new(EmailApiDispatcher::new(
            email.api_url.clone(),
            &email.api_key,
            &email.from,
        )?),
        None => {
            info!("EMAIL_API_URL not set, review notifications are only logged");
            Arc::new(LogOnlyDispatcher)
        }
    };

    let review_check = &dotenvy_env.review_check;
    let attribution_usecase = Arc::new(ReviewAttributionUseCase::new(
        Arc::clone(&review_check_repository),
        Arc::clone(&restaurant_repository),
        Arc::clone(&scan_repository),
        Arc::new(ReviewNotificationPostgres::new(Arc::clone(&db_pool_arc))),
        reviews_api,
        dispatcher,
        AttributionSettings {
            schedule: ReviewCheckSchedule {
                interval_seconds: review_check.interval_seconds,
                max_api_errors: review_check.max_api_errors,
                ..ReviewCheckSchedule::default()
            },
            notify_no_review: review_check.notify_no_review,
        },
    ));

    let maintenance_config = &dotenvy_env.maintenance;
    let maintenance_usecase = Arc::new(MaintenanceUseCase::new(
        restaurant_repository,
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(ScanCooldownPostgres::new(Arc::clone(&db_pool_arc))),
        review_check_repository,
        chrono::Duration::seconds(maintenance_config.cooldown_seconds),
        chrono::Duration::seconds(maintenance_config.stale_lock_seconds),
    ));

    // Spawn background loops
    let review_check_loop = tokio::spawn(review_checking::worker::run(
        attribution_usecase,
        review_check.worker_id.clone(),
        Duration::from_secs(review_check.poll_seconds.max(1)),
    ));
    let maintenance_loop = tokio::spawn(maintenance::worker::run(
        maintenance_usecase,
        Duration::from_secs(maintenance_config.interval_seconds.max(1)),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let health_server = tokio::spawn(axum_http::http_serve::start(server_config));

    tokio::select! {
        result = review_check_loop => result??,
        result = maintenance_loop => result??,
        result = health_server => result??,
    };
    Ok(())
}
