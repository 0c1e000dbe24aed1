#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub auth: Auth,
    pub public_base_url: String,
    pub scan: Scan,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB.
    pub body_limit: u64,
    /// Seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_pool_size: u32,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownBackend {
    Memory,
    Postgres,
}

impl CooldownBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Some(CooldownBackend::Memory),
            "postgres" | "pg" | "database" => Some(CooldownBackend::Postgres),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scan {
    pub cooldown_seconds: i64,
    pub cooldown_backend: CooldownBackend,
    pub review_check_first_delay_seconds: i64,
    pub review_check_max_attempts: i32,
}
