use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Auth
    pub jwt_secret: String,

    // API settings
    pub api_host: String,
    pub api_port: u16,
    pub request_timeout_ms: u64,

    // Widget data
    pub default_series_limit: u64,
    pub max_series_limit: u64,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_data_per_second: u64,
    pub rate_limit_data_burst: u32,
    pub rate_limit_admin_per_second: u64,
    pub rate_limit_admin_burst: u32,

    // Caching
    pub dashboard_cache_ttl_seconds: u64,
    pub dashboard_cache_max_entries: u64,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unparseable optional values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `DATABASE_URL` or `JWT_SECRET` is absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,

            api_host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port: parse_or(&lookup, "API_PORT", 3000),
            request_timeout_ms: parse_or(&lookup, "REQUEST_TIMEOUT_MS", 5000),

            default_series_limit: parse_or(&lookup, "DEFAULT_SERIES_LIMIT", 200),
            max_series_limit: parse_or(&lookup, "MAX_SERIES_LIMIT", 5000),

            disable_rate_limiting: parse_or(&lookup, "DISABLE_RATE_LIMITING", false),
            rate_limit_data_per_second: parse_or(&lookup, "RATE_LIMIT_DATA_PER_SECOND", 10),
            rate_limit_data_burst: parse_or(&lookup, "RATE_LIMIT_DATA_BURST", 60),
            rate_limit_admin_per_second: parse_or(&lookup, "RATE_LIMIT_ADMIN_PER_SECOND", 1),
            rate_limit_admin_burst: parse_or(&lookup, "RATE_LIMIT_ADMIN_BURST", 30),

            dashboard_cache_ttl_seconds: parse_or(&lookup, "DASHBOARD_CACHE_TTL_SECONDS", 300),
            dashboard_cache_max_entries: parse_or(&lookup, "DASHBOARD_CACHE_MAX_ENTRIES", 10_000),

            deployment: Deployment::from_str(
                &lookup("DEPLOYMENT").unwrap_or_else(|| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
