//! Configuration parsing from a key lookup.
//!
//! Run with: cargo test --test config_test

use flowboard::config::{Config, ConfigError, Deployment};
use std::collections::HashMap;
use std::time::Duration;

fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    Config::from_lookup(|key| env.get(key).cloned())
}

const REQUIRED: [(&str, &str); 2] = [
    ("DATABASE_URL", "postgres://localhost/flowboard"),
    ("JWT_SECRET", "secret"),
];

#[test]
fn defaults_fill_optional_values() {
    let config = load(&REQUIRED).unwrap();

    assert_eq!(config.bind_address(), "0.0.0.0:3000");
    assert_eq!(config.request_timeout(), Duration::from_millis(5000));
    assert_eq!(config.default_series_limit, 200);
    assert_eq!(config.max_series_limit, 5000);
    assert!(!config.disable_rate_limiting);
    assert_eq!(config.dashboard_cache_ttl_seconds, 300);
    assert_eq!(config.deployment, Deployment::Local);
}

#[test]
fn missing_required_keys_fail() {
    let err = load(&REQUIRED[..1]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

    let err = load(&[]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
}

#[test]
fn overrides_are_parsed() {
    let mut pairs = REQUIRED.to_vec();
    pairs.extend([
        ("API_PORT", "8080"),
        ("REQUEST_TIMEOUT_MS", "250"),
        ("DEFAULT_SERIES_LIMIT", "50"),
        ("DISABLE_RATE_LIMITING", "true"),
        ("DEPLOYMENT", "Production"),
    ]);
    let config = load(&pairs).unwrap();

    assert_eq!(config.api_port, 8080);
    assert_eq!(config.request_timeout(), Duration::from_millis(250));
    assert_eq!(config.default_series_limit, 50);
    assert!(config.disable_rate_limiting);
    assert_eq!(config.deployment, Deployment::Prod);
}

#[test]
fn malformed_numbers_fall_back_to_defaults() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("API_PORT", "eighty"));
    let config = load(&pairs).unwrap();
    assert_eq!(config.api_port, 3000);
}
