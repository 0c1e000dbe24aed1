use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use crates::{
    domain::repositories::{
        restaurants::RestaurantRepository, review_notifications::ReviewNotificationRepository,
        scans::ScanRepository,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            restaurants::RestaurantPostgres, review_notifications::ReviewNotificationPostgres,
            scans::ScanPostgres,
        },
    },
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{auth::AuthUser, usecases::activity::ActivityUseCase};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let activity_usecase = ActivityUseCase::new(
        Arc::new(RestaurantPostgres::new(Arc::clone(&db_pool))),
        Arc::new(ScanPostgres::new(Arc::clone(&db_pool))),
        Arc::new(ReviewNotificationPostgres::new(Arc::clone(&db_pool))),
    );

    router(Arc::new(activity_usecase))
}

pub fn router<R, S, N>(activity_usecase: Arc<ActivityUseCase<R, S, N>>) -> Router
where
    R: RestaurantRepository + Send + Sync + 'static,
    S: ScanRepository + Send + Sync + 'static,
    N: ReviewNotificationRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/restaurants/:restaurant_id/scans",
            get(list_scans::<R, S, N>),
        )
        .route(
            "/restaurants/:restaurant_id/review-notifications",
            get(list_review_notifications::<R, S, N>),
        )
        .with_state(activity_usecase)
}

pub async fn list_scans<R, S, N>(
    State(activity_usecase): State<Arc<ActivityUseCase<R, S, N>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    S: ScanRepository + Send + Sync,
    N: ReviewNotificationRepository + Send + Sync,
{
    match activity_usecase
        .recent_scans(&auth, restaurant_id, query.limit)
        .await
    {
        Ok(scans) => (StatusCode::OK, Json(scans)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list_review_notifications<R, S, N>(
    State(activity_usecase): State<Arc<ActivityUseCase<R, S, N>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    S: ScanRepository + Send + Sync,
    N: ReviewNotificationRepository + Send + Sync,
{
    match activity_usecase
        .recent_review_notifications(&auth, restaurant_id, query.limit)
        .await
    {
        Ok(notifications) => (StatusCode::OK, Json(notifications)).into_response(),
        Err(err) => err.into_response(),
    }
}
