use axum::{
    Router,
    extract::{Path, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, LOCATION},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Duration, Utc};
use crates::{
    domain::{
        repositories::scan_cooldowns::ScanCooldownStore,
        value_objects::review_checks::ReviewCheckSchedule,
    },
    infra::{
        cooldown::memory::InMemoryScanCooldownStore,
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                qr_codes::QrCodePostgres, restaurants::RestaurantPostgres,
                review_checks::ReviewCheckPostgres, scan_cooldowns::ScanCooldownPostgres,
                scans::ScanPostgres, tables::TablePostgres,
            },
        },
    },
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    axum_http::{
        client_meta::ClientMeta,
        error_responses::{prefers_json, scan_error_response},
        routers::cooldown_sweeper,
    },
    config::config_model::{CooldownBackend, DotEnvyConfig},
    usecases::{
        scan_recorder::{RecordOutcome, ScanRecorder},
        scan_resolver::{ScanError, ScanResolver},
    },
};

pub struct ScanState {
    pub resolver: ScanResolver,
    pub recorder: Arc<ScanRecorder>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: &DotEnvyConfig) -> Router {
    let scan_config = &config.scan;
    let cooldown_window = Duration::seconds(scan_config.cooldown_seconds);

    let cooldown_store: Arc<dyn ScanCooldownStore + Send + Sync> =
        match scan_config.cooldown_backend {
            CooldownBackend::Memory => {
                let store = Arc::new(InMemoryScanCooldownStore::new());
                cooldown_sweeper::spawn(Arc::clone(&store), cooldown_window);
                store
            }
            CooldownBackend::Postgres => {
                Arc::new(ScanCooldownPostgres::new(Arc::clone(&db_pool)))
            }
        };
    info!(backend = ?scan_config.cooldown_backend, "scan: cooldown store selected");

    let resolver = ScanResolver::new(
        Arc::new(QrCodePostgres::new(Arc::clone(&db_pool))),
        Arc::new(TablePostgres::new(Arc::clone(&db_pool))),
        Arc::new(RestaurantPostgres::new(Arc::clone(&db_pool))),
    );

    let schedule = ReviewCheckSchedule {
        first_delay_seconds: scan_config.review_check_first_delay_seconds,
        max_attempts: scan_config.review_check_max_attempts,
        ..ReviewCheckSchedule::default()
    };
    let recorder = ScanRecorder::new(
        Arc::new(ScanPostgres::new(Arc::clone(&db_pool))),
        cooldown_store,
        Arc::new(ReviewCheckPostgres::new(Arc::clone(&db_pool))),
        cooldown_window,
        schedule,
    );

    router(Arc::new(ScanState {
        resolver,
        recorder: Arc::new(recorder),
    }))
}

pub fn router(state: Arc<ScanState>) -> Router {
    Router::new()
        .route("/scan/:code", get(scan))
        .route("/qr/:code", get(scan))
        .route("/r/:code", get(scan))
        .with_state(state)
}

pub async fn scan(
    State(state): State<Arc<ScanState>>,
    Path(code): Path<String>,
    client: ClientMeta,
    headers: HeaderMap,
) -> Response {
    let now = Utc::now();

    let resolved = match state.resolver.resolve(&code, now).await {
        Ok(resolved) => resolved,
        Err(err) => return scan_error_response(&err, prefers_json(&headers)),
    };

    let location = match HeaderValue::from_str(&resolved.redirect.url) {
        Ok(location) => location,
        Err(err) => {
            error!(
                code = %resolved.qr_code.code,
                restaurant_id = %resolved.restaurant.id,
                error = %err,
                "scan: redirect url is not a valid header value"
            );
            return scan_error_response(&ScanError::DataInconsistent, prefers_json(&headers));
        }
    };

    let response = (
        StatusCode::FOUND,
        [
            (LOCATION, location),
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
    )
        .into_response();

    let recorder = Arc::clone(&state.recorder);
    let metadata = client.into_scan_metadata();
    tokio::spawn(async move {
        match recorder.record(&resolved, &metadata, now).await {
            Ok(RecordOutcome::Recorded { .. }) | Ok(RecordOutcome::Throttled) => {}
            Err(err) => error!(
                code = %resolved.qr_code.code,
                error = ?err,
                "scan: recording failed after redirect"
            ),
        }
    });

    response
}
