use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            plans::PlanRepository, restaurants::RestaurantRepository,
            subscriptions::SubscriptionRepository,
        },
        value_objects::subscriptions::CreateSubscriptionModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            plans::PlanPostgres, restaurants::RestaurantPostgres,
            subscriptions::SubscriptionPostgres,
        },
    },
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{auth::AuthUser, usecases::subscriptions::SubscriptionUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscription_usecase = SubscriptionUseCase::new(
        Arc::new(RestaurantPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PlanPostgres::new(Arc::clone(&db_pool))),
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool))),
    );

    router(Arc::new(subscription_usecase))
}

pub fn router<R, P, S>(subscription_usecase: Arc<SubscriptionUseCase<R, P, S>>) -> Router
where
    R: RestaurantRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/restaurants/:restaurant_id/subscription",
            get(current::<R, P, S>).post(subscribe::<R, P, S>),
        )
        .route(
            "/restaurants/:restaurant_id/subscription/cancel",
            post(cancel::<R, P, S>),
        )
        .with_state(subscription_usecase)
}

pub async fn current<R, P, S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<R, P, S>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    P: PlanRepository + Send + Sync,
    S: SubscriptionRepository + Send + Sync,
{
    match subscription_usecase.current(&auth, restaurant_id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn subscribe<R, P, S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<R, P, S>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Json(create_subscription_model): Json<CreateSubscriptionModel>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    P: PlanRepository + Send + Sync,
    S: SubscriptionRepository + Send + Sync,
{
    match subscription_usecase
        .subscribe(&auth, restaurant_id, create_subscription_model)
        .await
    {
        Ok(subscription) => (StatusCode::CREATED, Json(subscription)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn cancel<R, P, S>(
    State(subscription_usecase): State<Arc<SubscriptionUseCase<R, P, S>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    P: PlanRepository + Send + Sync,
    S: SubscriptionRepository + Send + Sync,
{
    match subscription_usecase.cancel(&auth, restaurant_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}
