mod response;
mod state;

pub use response::{ApiJson, ApiQuery, ApiResponse};
pub use state::{AppState, CacheEpoch, DashboardCache};
