use moka::future::Cache;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::services::dashboard::DashboardView;

/// Composed dashboards keyed by company id. Entries are dropped explicitly
/// whenever a layout mutation touches the company's dashboard.
pub type DashboardCache = Cache<Uuid, Arc<DashboardView>>;

/// Bumped on every invalidation. A view composed before a bump is never
/// left in the cache.
pub type CacheEpoch = Arc<AtomicU64>;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<Config>,
    pub authenticator: Arc<Authenticator>,
    pub dashboard_cache: DashboardCache,
    pub dashboard_epoch: CacheEpoch,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let cache: DashboardCache = Cache::builder()
            .max_capacity(config.dashboard_cache_max_entries)
            .time_to_live(Duration::from_secs(config.dashboard_cache_ttl_seconds))
            .build();

        Self {
            db: Arc::new(db),
            authenticator: Arc::new(Authenticator::new(&config.jwt_secret)),
            config: Arc::new(config),
            dashboard_cache: cache,
            dashboard_epoch: Arc::new(AtomicU64::new(0)),
        }
    }
}
