//! Widget-data query validation and scoping.
//!
//! Run with: cargo test --test filters_test

use axum::extract::Query;
use axum::http::Uri;
use chrono::{TimeZone, Utc};
use flowboard::error::AppError;
use flowboard::widget::{Scope, TimeRange, WidgetDataQuery, WidgetFilters};
use uuid::Uuid;

const DEFAULT_LIMIT: u64 = 200;
const MAX_LIMIT: u64 = 5000;

fn parse(uri: &str) -> Result<WidgetFilters, AppError> {
    let uri: Uri = uri.parse().unwrap();
    let Query(query) = Query::<WidgetDataQuery>::try_from_uri(&uri).unwrap();
    WidgetFilters::from_query(&query, DEFAULT_LIMIT, MAX_LIMIT)
}

#[test]
fn defaults_apply_without_parameters() {
    let filters = parse("/api/widget-data/w").unwrap();
    assert_eq!(filters.time_range, TimeRange::OneDay);
    assert_eq!(filters.limit, DEFAULT_LIMIT);
    assert_eq!(filters.scope(), Scope::Company);
}

#[test]
fn every_time_range_parses() {
    for range in TimeRange::ALL {
        let filters = parse(&format!("/w?timeRange={}", range.as_str())).unwrap();
        assert_eq!(filters.time_range, range);
    }
    assert!(matches!(parse("/w?timeRange=2h"), Err(AppError::Validation(_))));
}

#[test]
fn time_windows_nest() {
    let now = Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();
    assert_eq!(
        TimeRange::OneHour.since(now),
        Utc.with_ymd_and_hms(2026, 10, 15, 11, 0, 0).unwrap()
    );

    let bounds: Vec<_> = TimeRange::ALL.iter().map(|r| r.since(now)).collect();
    assert!(bounds.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn limit_bounds_are_enforced() {
    assert_eq!(parse("/w?limit=50").unwrap().limit, 50);
    assert_eq!(parse("/w?limit=5000").unwrap().limit, 5000);
    assert!(matches!(parse("/w?limit=0"), Err(AppError::Validation(_))));
    assert!(matches!(parse("/w?limit=5001"), Err(AppError::Validation(_))));
    assert!(matches!(parse("/w?limit=ten"), Err(AppError::Validation(_))));
}

#[test]
fn empty_parameters_count_as_absent() {
    let filters = parse("/w?timeRange=&hierarchyId=&deviceId=&limit=").unwrap();
    assert_eq!(filters, WidgetFilters::new(DEFAULT_LIMIT));
}

#[test]
fn device_filter_wins_over_hierarchy() {
    let node = Uuid::new_v4();
    let device = Uuid::new_v4();

    let filters = parse(&format!("/w?hierarchyId={node}&deviceId={device}")).unwrap();
    assert_eq!(filters.scope(), Scope::Device(device));

    // Both filters are still echoed back
    let echo = filters.echo();
    assert_eq!(echo.hierarchy_id, Some(node));
    assert_eq!(echo.device_id, Some(device));

    let filters = parse(&format!("/w?hierarchyId={node}")).unwrap();
    assert_eq!(filters.scope(), Scope::Hierarchy(node));
}

#[test]
fn malformed_ids_are_rejected() {
    let err = parse("/w?deviceId=pump-7").unwrap_err();
    assert!(matches!(err, AppError::Validation(msg) if msg.contains("deviceId")));
}

#[test]
fn client_company_id_is_ignored() {
    let other = Uuid::new_v4();
    let filters = parse(&format!("/w?companyId={other}&timeRange=1h")).unwrap();
    assert_eq!(filters.time_range, TimeRange::OneHour);
    assert_eq!(filters.scope(), Scope::Company);
}

#[test]
fn echo_serializes_time_range_label() {
    let filters = parse("/w?timeRange=7d").unwrap();
    let json = serde_json::to_value(filters.echo()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"hierarchyId": null, "deviceId": null, "timeRange": "7d"})
    );
}
