use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{qr_codes::QrCodeRepository, restaurants::RestaurantRepository},
        value_objects::restaurants::{CreateRestaurantModel, UpdateRestaurantModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{qr_codes::QrCodePostgres, restaurants::RestaurantPostgres},
    },
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{auth::AuthUser, usecases::restaurants::RestaurantUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let restaurant_repository = RestaurantPostgres::new(Arc::clone(&db_pool));
    let qr_code_repository = QrCodePostgres::new(Arc::clone(&db_pool));
    let restaurant_usecase =
        RestaurantUseCase::new(Arc::new(restaurant_repository), Arc::new(qr_code_repository));

    router(Arc::new(restaurant_usecase))
}

pub fn router<R, Q>(restaurant_usecase: Arc<RestaurantUseCase<R, Q>>) -> Router
where
    R: RestaurantRepository + Send + Sync + 'static,
    Q: QrCodeRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/restaurants", post(create::<R, Q>).get(list::<R, Q>))
        .route(
            "/restaurants/:restaurant_id",
            get(get_one::<R, Q>).patch(update::<R, Q>),
        )
        .route("/restaurants/:restaurant_id/activate", post(activate::<R, Q>))
        .route(
            "/restaurants/:restaurant_id/deactivate",
            post(deactivate::<R, Q>),
        )
        .with_state(restaurant_usecase)
}

pub async fn create<R, Q>(
    State(restaurant_usecase): State<Arc<RestaurantUseCase<R, Q>>>,
    auth: AuthUser,
    Json(create_restaurant_model): Json<CreateRestaurantModel>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match restaurant_usecase
        .create(&auth, create_restaurant_model)
        .await
    {
        Ok(restaurant) => (StatusCode::CREATED, Json(restaurant)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list<R, Q>(
    State(restaurant_usecase): State<Arc<RestaurantUseCase<R, Q>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match restaurant_usecase.list(&auth).await {
        Ok(restaurants) => (StatusCode::OK, Json(restaurants)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_one<R, Q>(
    State(restaurant_usecase): State<Arc<RestaurantUseCase<R, Q>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match restaurant_usecase.get(&auth, restaurant_id).await {
        Ok(restaurant) => (StatusCode::OK, Json(restaurant)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update<R, Q>(
    State(restaurant_usecase): State<Arc<RestaurantUseCase<R, Q>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Json(update_restaurant_model): Json<UpdateRestaurantModel>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match restaurant_usecase
        .update(&auth, restaurant_id, update_restaurant_model)
        .await
    {
        Ok(restaurant) => (StatusCode::OK, Json(restaurant)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn activate<R, Q>(
    State(restaurant_usecase): State<Arc<RestaurantUseCase<R, Q>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match restaurant_usecase
        .set_active(&auth, restaurant_id, true)
        .await
    {
        Ok(restaurant) => (StatusCode::OK, Json(restaurant)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn deactivate<R, Q>(
    State(restaurant_usecase): State<Arc<RestaurantUseCase<R, Q>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    Q: QrCodeRepository + Send + Sync,
{
    match restaurant_usecase
        .set_active(&auth, restaurant_id, false)
        .await
    {
        Ok(restaurant) => (StatusCode::OK, Json(restaurant)).into_response(),
        Err(err) => err.into_response(),
    }
}
