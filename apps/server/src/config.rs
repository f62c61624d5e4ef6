use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use bcportal_connect::{DEFAULT_ADMIN_API_URL, DEFAULT_IDENTITY_URL, DEFAULT_SYNC_BATCH_SIZE};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_PATH: &str = "./db/app.db";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Output format of the server logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub request_timeout: Duration,
    pub cors_allow_origins: Vec<String>,
    pub admin_api_url: String,
    pub identity_url: String,
    pub sync_batch_size: usize,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads configuration from the process environment, after loading `.env`
    /// when one is present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr = env_or("BCP_LISTEN_ADDR", DEFAULT_LISTEN_ADDR)
            .parse()
            .context("BCP_LISTEN_ADDR is not a valid socket address")?;
        let request_timeout_ms: u64 = env_or(
            "BCP_REQUEST_TIMEOUT_MS",
            &DEFAULT_REQUEST_TIMEOUT_MS.to_string(),
        )
        .parse()
        .context("BCP_REQUEST_TIMEOUT_MS must be a number of milliseconds")?;
        let sync_batch_size: usize =
            env_or("BCP_SYNC_BATCH_SIZE", &DEFAULT_SYNC_BATCH_SIZE.to_string())
                .parse()
                .context("BCP_SYNC_BATCH_SIZE must be a positive integer")?;
        let log_format = parse_log_format(&env_or("BCP_LOG_FORMAT", "text"))?;

        Ok(Self {
            listen_addr,
            db_path: env_or("BCP_DB_PATH", DEFAULT_DB_PATH),
            request_timeout: Duration::from_millis(request_timeout_ms),
            cors_allow_origins: parse_origins(&env_or("BCP_CORS_ALLOW_ORIGINS", "*")),
            admin_api_url: env_or("BC_ADMIN_API_URL", DEFAULT_ADMIN_API_URL),
            identity_url: env_or("BC_IDENTITY_URL", DEFAULT_IDENTITY_URL),
            sync_batch_size: sync_batch_size.max(1),
            log_format,
        })
    }

    /// Defaults for everything, with the database at `db_path`.
    pub fn with_db_path(db_path: impl Into<String>) -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: db_path.into(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            cors_allow_origins: vec!["*".to_string()],
            admin_api_url: DEFAULT_ADMIN_API_URL.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            sync_batch_size: DEFAULT_SYNC_BATCH_SIZE,
            log_format: LogFormat::Text,
        }
    }
}

/// Unset and blank variables both fall back to the default.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();
    if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins
    }
}

fn parse_log_format(raw: &str) -> anyhow::Result<LogFormat> {
    if raw.eq_ignore_ascii_case("json") {
        Ok(LogFormat::Json)
    } else if raw.eq_ignore_ascii_case("text") {
        Ok(LogFormat::Text)
    } else {
        anyhow::bail!("BCP_LOG_FORMAT must be 'text' or 'json', got '{}'", raw)
    }
}
