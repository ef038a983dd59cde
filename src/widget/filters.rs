use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Look-back window for time-series widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[default]
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl TimeRange {
    pub const ALL: [Self; 5] = [
        Self::OneHour,
        Self::SixHours,
        Self::OneDay,
        Self::SevenDays,
        Self::ThirtyDays,
    ];

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::OneDay => "24h",
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
        }
    }

    #[must_use]
    pub fn duration(self) -> Duration {
        match self {
            Self::OneHour => Duration::hours(1),
            Self::SixHours => Duration::hours(6),
            Self::OneDay => Duration::hours(24),
            Self::SevenDays => Duration::days(7),
            Self::ThirtyDays => Duration::days(30),
        }
    }

    /// Inclusive lower bound of the window ending at `now`.
    #[must_use]
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

/// Raw widget-data query string. Everything arrives as text so malformed
/// values surface as validation errors in the response envelope; unknown
/// parameters (including any client-supplied `companyId`) are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct WidgetDataQuery {
    /// One of 1h, 6h, 24h (default), 7d, 30d
    pub time_range: Option<String>,
    /// Restrict to devices under this hierarchy node (inclusive)
    pub hierarchy_id: Option<String>,
    /// Restrict to a single device; wins over hierarchyId
    pub device_id: Option<String>,
    /// Maximum points per series (default 200)
    pub limit: Option<String>,
}

/// Device scoping refinement applied on top of company and device type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Company,
    Hierarchy(Uuid),
    Device(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetFilters {
    pub time_range: TimeRange,
    pub hierarchy_id: Option<Uuid>,
    pub device_id: Option<Uuid>,
    pub limit: u64,
}

impl WidgetFilters {
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self {
            time_range: TimeRange::default(),
            hierarchy_id: None,
            device_id: None,
            limit,
        }
    }

    /// Validate a raw query.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an unknown time range, a malformed
    /// id, or a limit outside `1..=max_limit`.
    pub fn from_query(
        query: &WidgetDataQuery,
        default_limit: u64,
        max_limit: u64,
    ) -> AppResult<Self> {
        let time_range = match non_empty(query.time_range.as_deref()) {
            None => TimeRange::default(),
            Some(raw) => TimeRange::parse(raw).ok_or_else(|| {
                AppError::Validation(format!(
                    "timeRange must be one of 1h, 6h, 24h, 7d, 30d (got '{raw}')"
                ))
            })?,
        };

        let limit = match non_empty(query.limit.as_deref()) {
            None => default_limit,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|n| (1..=max_limit).contains(n))
                .ok_or_else(|| {
                    AppError::Validation(format!("limit must be between 1 and {max_limit}"))
                })?,
        };

        Ok(Self {
            time_range,
            hierarchy_id: parse_id("hierarchyId", query.hierarchy_id.as_deref())?,
            device_id: parse_id("deviceId", query.device_id.as_deref())?,
            limit,
        })
    }

    /// Most specific refinement wins: a device filter overrides a hierarchy filter.
    #[must_use]
    pub fn scope(&self) -> Scope {
        match (self.device_id, self.hierarchy_id) {
            (Some(device), _) => Scope::Device(device),
            (None, Some(node)) => Scope::Hierarchy(node),
            (None, None) => Scope::Company,
        }
    }

    #[must_use]
    pub fn echo(&self) -> FilterEcho {
        FilterEcho {
            hierarchy_id: self.hierarchy_id,
            device_id: self.device_id,
            time_range: Some(self.time_range),
        }
    }
}

/// Resolved filter context returned alongside widget data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterEcho {
    pub hierarchy_id: Option<Uuid>,
    pub device_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_id(field: &str, raw: Option<&str>) -> AppResult<Option<Uuid>> {
    non_empty(raw)
        .map(|s| {
            s.parse::<Uuid>()
                .map_err(|_| AppError::Validation(format!("{field} must be a valid id")))
        })
        .transpose()
}
