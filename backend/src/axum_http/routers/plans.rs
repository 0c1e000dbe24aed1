use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use crates::{
    domain::{repositories::plans::PlanRepository, value_objects::plans::CreatePlanModel},
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::plans::PlanPostgres},
};
use std::sync::Arc;

use crate::{auth::AuthUser, usecases::plans::PlanUseCase};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let plan_usecase = PlanUseCase::new(Arc::new(plan_repository));

    router(Arc::new(plan_usecase))
}

pub fn router<P>(plan_usecase: Arc<PlanUseCase<P>>) -> Router
where
    P: PlanRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/plans", get(list_plans::<P>).post(create_plan::<P>))
        .with_state(plan_usecase)
}

pub async fn list_plans<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    _auth: AuthUser,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync,
{
    match plan_usecase.list_active().await {
        Ok(plans) => (StatusCode::OK, Json(plans)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn create_plan<P>(
    State(plan_usecase): State<Arc<PlanUseCase<P>>>,
    auth: AuthUser,
    Json(create_plan_model): Json<CreatePlanModel>,
) -> impl IntoResponse
where
    P: PlanRepository + Send + Sync,
{
    match plan_usecase.create(&auth, create_plan_model).await {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(err) => err.into_response(),
    }
}
