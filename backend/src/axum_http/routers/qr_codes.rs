use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::repositories::{
        qr_codes::QrCodeRepository, restaurants::RestaurantRepository, tables::TableRepository,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            qr_codes::QrCodePostgres, restaurants::RestaurantPostgres, tables::TablePostgres,
        },
    },
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{auth::AuthUser, usecases::qr_codes::QrCodeUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>, public_base_url: String) -> Router {
    let qr_code_usecase = QrCodeUseCase::new(
        Arc::new(RestaurantPostgres::new(Arc::clone(&db_pool))),
        Arc::new(TablePostgres::new(Arc::clone(&db_pool))),
        Arc::new(QrCodePostgres::new(Arc::clone(&db_pool))),
        public_base_url,
    );

    router(Arc::new(qr_code_usecase))
}

pub fn router<R, T, Q>(qr_code_usecase: Arc<QrCodeUseCase<R, T, Q>>) -> Router
where
    R: RestaurantRepository + Send + Sync + 'static,
    T: TableRepository + Send + Sync + 'static,
    Q: QrCodeRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/tables/:table_id/qr-code",
            post(generate::<R, T, Q>).get(get_for_table::<R, T, Q>),
        )
        .route(
            "/tables/:table_id/qr-code/activate",
            post(activate::<R, T, Q>),
        )
        .route(
            "/tables/:table_id/qr-code/deactivate",
            post(deactivate::<R, T, Q>),
        )
        .with_state(qr_code_usecase)
}

pub async fn generate<R, T, Q>(
    State(qr_code_usecase): State<Arc<QrCodeUseCase<R, T, Q>>>,
    auth: AuthUser,
    Path(table_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    T: TableRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match qr_code_usecase.generate(&auth, table_id).await {
        Ok(issued) if issued.created => (StatusCode::CREATED, Json(issued.qr_code)).into_response(),
        Ok(issued) => (StatusCode::OK, Json(issued.qr_code)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_for_table<R, T, Q>(
    State(qr_code_usecase): State<Arc<QrCodeUseCase<R, T, Q>>>,
    auth: AuthUser,
    Path(table_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    T: TableRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match qr_code_usecase.get(&auth, table_id).await {
        Ok(qr_code) => (StatusCode::OK, Json(qr_code)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn activate<R, T, Q>(
    State(qr_code_usecase): State<Arc<QrCodeUseCase<R, T, Q>>>,
    auth: AuthUser,
    Path(table_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    T: TableRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match qr_code_usecase.set_active(&auth, table_id, true).await {
        Ok(qr_code) => (StatusCode::OK, Json(qr_code)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn deactivate<R, T, Q>(
    State(qr_code_usecase): State<Arc<QrCodeUseCase<R, T, Q>>>,
    auth: AuthUser,
    Path(table_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    T: TableRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match qr_code_usecase.set_active(&auth, table_id, false).await {
        Ok(qr_code) => (StatusCode::OK, Json(qr_code)).into_response(),
        Err(err) => err.into_response(),
    }
}
