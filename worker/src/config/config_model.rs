use url::Url;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub google_places: GooglePlaces,
    pub email: Option<Email>,
    pub review_check: ReviewCheck,
    pub maintenance: Maintenance,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_pool_size: u32,
}

#[derive(Debug, Clone)]
pub struct GooglePlaces {
    pub api_key: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Email {
    pub api_url: Url,
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct ReviewCheck {
    pub worker_id: String,
    pub interval_seconds: i64,
    pub max_api_errors: i32,
    pub poll_seconds: u64,
    pub notify_no_review: bool,
}

#[derive(Debug, Clone)]
pub struct Maintenance {
    pub interval_seconds: u64,
    pub cooldown_seconds: i64,
    /// Running checks locked longer than this are handed back to the sweep.
    pub stale_lock_seconds: i64,
}
