use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
};
use crates::{
    domain::{
        repositories::{
            plans::PlanRepository, restaurants::RestaurantRepository,
            subscriptions::SubscriptionRepository, tables::TableRepository,
        },
        value_objects::{
            plans::TRIAL_PLAN_ID,
            tables::{CreateTableModel, UpdateTableModel},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            plans::PlanPostgres, restaurants::RestaurantPostgres,
            subscriptions::SubscriptionPostgres, tables::TablePostgres,
        },
    },
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    usecases::{plan_resolver::PlanResolver, tables::TableUseCase},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_resolver = PlanResolver::new(
        Arc::new(PlanPostgres::new(Arc::clone(&db_pool))),
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool))),
        TRIAL_PLAN_ID,
    );
    let table_usecase = TableUseCase::new(
        Arc::new(RestaurantPostgres::new(Arc::clone(&db_pool))),
        Arc::new(TablePostgres::new(Arc::clone(&db_pool))),
        plan_resolver,
    );

    router(Arc::new(table_usecase))
}

pub fn router<R, T, P, S>(table_usecase: Arc<TableUseCase<R, T, P, S>>) -> Router
where
    R: RestaurantRepository + Send + Sync + 'static,
    T: TableRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/restaurants/:restaurant_id/tables",
            post(create::<R, T, P, S>).get(list::<R, T, P, S>),
        )
        .route("/tables/:table_id", patch(update::<R, T, P, S>))
        .route("/tables/:table_id/activate", post(activate::<R, T, P, S>))
        .route("/tables/:table_id/deactivate", post(deactivate::<R, T, P, S>))
        .with_state(table_usecase)
}

pub async fn create<R, T, P, S>(
    State(table_usecase): State<Arc<TableUseCase<R, T, P, S>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
    Json(create_table_model): Json<CreateTableModel>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    T: TableRepository + Send + Sync,
    P: PlanRepository + Send + Sync,
    S: SubscriptionRepository + Send + Sync,
{
    match table_usecase
        .create(&auth, restaurant_id, create_table_model)
        .await
    {
        Ok(table) => (StatusCode::CREATED, Json(table)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list<R, T, P, S>(
    State(table_usecase): State<Arc<TableUseCase<R, T, P, S>>>,
    auth: AuthUser,
    Path(restaurant_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    T: TableRepository + Send + Sync,
    P: PlanRepository + Send + Sync,
    S: SubscriptionRepository + Send + Sync,
{
    match table_usecase.list(&auth, restaurant_id).await {
        Ok(tables) => (StatusCode::OK, Json(tables)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update<R, T, P, S>(
    State(table_usecase): State<Arc<TableUseCase<R, T, P, S>>>,
    auth: AuthUser,
    Path(table_id): Path<Uuid>,
    Json(update_table_model): Json<UpdateTableModel>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    T: TableRepository + Send + Sync,
    P: PlanRepository + Send + Sync,
    S: SubscriptionRepository + Send + Sync,
{
    match table_usecase
        .update(&auth, table_id, update_table_model)
        .await
    {
        Ok(table) => (StatusCode::OK, Json(table)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn activate<R, T, P, S>(
    State(table_usecase): State<Arc<TableUseCase<R, T, P, S>>>,
    auth: AuthUser,
    Path(table_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    T: TableRepository + Send + Sync,
    P: PlanRepository + Send + Sync,
    S: SubscriptionRepository + Send + Sync,
{
    match table_usecase.set_active(&auth, table_id, true).await {
        Ok(table) => (StatusCode::OK, Json(table)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn deactivate<R, T, P, S>(
    State(table_usecase): State<Arc<TableUseCase<R, T, P, S>>>,
    auth: AuthUser,
    Path(table_id): Path<Uuid>,
) -> impl IntoResponse
where
    R: RestaurantRepository + Send + Sync,
    T: TableRepository + Send + Sync,
    P: PlanRepository + Send + Sync,
    S: SubscriptionRepository + Send + Sync,
{
    match table_usecase.set_active(&auth, table_id, false).await {
        Ok(table) => (StatusCode::OK, Json(table)).into_response(),
        Err(err) => err.into_response(),
    }
}
