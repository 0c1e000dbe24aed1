use anyhow::{Context, Result};
use std::{env, str::FromStr};
use url::Url;
use uuid::Uuid;

use super::config_model::{
    Database, DotEnvyConfig, Email, GooglePlaces, Maintenance, ReviewCheck, WorkerServer,
};
use crates::infra::reviews::google_places::DEFAULT_BASE_URL;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?,
        body_limit: optional("SERVER_BODY_LIMIT", 1)?,
        timeout: optional("SERVER_TIMEOUT", 30)?,
    };

    let database = Database {
        url: env::var("DATABASE_URL").context("DATABASE_URL is invalid")?,
        max_pool_size: optional("DATABASE_MAX_POOL_SIZE", 5)?,
    };

    let google_places = GooglePlaces {
        api_key: env::var("GOOGLE_PLACES_API_KEY").context("GOOGLE_PLACES_API_KEY is invalid")?,
        base_url: non_empty("GOOGLE_PLACES_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        timeout_seconds: optional("GOOGLE_PLACES_TIMEOUT_SECONDS", 10)?,
    };

    let email = match non_empty("EMAIL_API_URL") {
        Some(raw) => Some(Email {
            api_url: Url::parse(&raw).context("EMAIL_API_URL is invalid")?,
            api_key: env::var("EMAIL_API_KEY").context("EMAIL_API_KEY is invalid")?,
            from: env::var("EMAIL_FROM").context("EMAIL_FROM is invalid")?,
        }),
        None => None,
    };

    let review_check = ReviewCheck {
        worker_id: non_empty("WORKER_ID")
            .unwrap_or_else(|| format!("worker-{}", Uuid::new_v4().simple())),
        interval_seconds: optional("REVIEW_CHECK_INTERVAL_SECONDS", 300)?,
        max_api_errors: optional("REVIEW_CHECK_MAX_API_ERRORS", 3)?,
        poll_seconds: optional("REVIEW_CHECK_POLL_SECONDS", 5)?,
        notify_no_review: optional("NOTIFY_NO_REVIEW", false)?,
    };

    let maintenance = Maintenance {
        interval_seconds: optional("MAINTENANCE_INTERVAL_SECONDS", 300)?,
        cooldown_seconds: optional("SCAN_COOLDOWN_SECONDS", 30)?,
        stale_lock_seconds: optional("REVIEW_CHECK_STALE_LOCK_SECONDS", 600)?,
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        google_places,
        email,
        review_check,
        maintenance,
    })
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .with_context(|| format!("{key} is invalid"))?
        .trim()
        .parse()
        .with_context(|| format!("{key} is invalid"))
}

fn optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(key) {
        Some(raw) => raw.parse().with_context(|| format!("{key} is invalid")),
        None => Ok(default),
    }
}
