use anyhow::{Context, Result, anyhow};
use std::{env, str::FromStr};

use super::config_model::{Auth, BackendServer, CooldownBackend, Database, DotEnvyConfig, Scan};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?,
        body_limit: optional("SERVER_BODY_LIMIT", 1)?,
        timeout: optional("SERVER_TIMEOUT", 30)?,
    };

    let database = Database {
        url: env::var("DATABASE_URL").context("DATABASE_URL is invalid")?,
        max_pool_size: optional("DATABASE_MAX_POOL_SIZE", 10)?,
    };

    let auth = Auth {
        jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET is invalid")?,
    };

    let public_base_url = env::var("PUBLIC_BASE_URL")
        .context("PUBLIC_BASE_URL is invalid")?
        .trim_end_matches('/')
        .to_string();
    url::Url::parse(&public_base_url).context("PUBLIC_BASE_URL is not a valid url")?;

    let cooldown_backend = match env::var("SCAN_COOLDOWN_BACKEND") {
        Ok(raw) => CooldownBackend::parse(&raw)
            .ok_or_else(|| anyhow!("SCAN_COOLDOWN_BACKEND is invalid: {raw}"))?,
        Err(_) => CooldownBackend::Memory,
    };

    let scan = Scan {
        cooldown_seconds: optional("SCAN_COOLDOWN_SECONDS", 30)?,
        cooldown_backend,
        review_check_first_delay_seconds: optional("REVIEW_CHECK_FIRST_DELAY_SECONDS", 120)?,
        review_check_max_attempts: optional("REVIEW_CHECK_MAX_ATTEMPTS", 6)?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        auth,
        public_base_url,
        scan,
    })
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
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(default),
    }
}
