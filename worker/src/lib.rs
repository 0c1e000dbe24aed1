pub mod axum_http;
pub mod config;
pub mod maintenance;
pub mod review_checking;
pub mod usecases;
