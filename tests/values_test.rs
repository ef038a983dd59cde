//! Value extraction and latest-value aggregation.
//!
//! Run with: cargo test --test values_test

use flowboard::widget::{latest_value, mean_of_present, series_value};
use serde_json::{Value, json};

#[test]
fn series_values_convert_numbers_and_null() {
    assert_eq!(series_value(&json!(12.5)), Some(12.5));
    assert_eq!(series_value(&json!(3)), Some(3.0));
    assert_eq!(series_value(&json!(" 4.25 ")), Some(4.25));
    assert_eq!(series_value(&Value::Null), Some(0.0));
}

#[test]
fn series_values_drop_non_numeric() {
    assert_eq!(series_value(&json!("offline")), None);
    assert_eq!(series_value(&json!(true)), None);
    assert_eq!(series_value(&json!({"v": 1})), None);
    assert_eq!(series_value(&json!("NaN")), None);
}

#[test]
fn latest_values_treat_null_and_absent_as_missing() {
    assert_eq!(latest_value(None), None);
    assert_eq!(latest_value(Some(&Value::Null)), None);
    assert_eq!(latest_value(Some(&json!(0))), Some(0.0));
    assert_eq!(latest_value(Some(&json!("7"))), Some(7.0));
}

#[test]
fn aggregate_excludes_missing_values() {
    // 3 of 5 devices report
    let values = [Some(10.0), None, Some(20.0), None, Some(30.0)];
    let aggregate = mean_of_present(values);

    assert_eq!(aggregate.count, 3);
    assert_eq!(aggregate.value, Some(20.0));
}

#[test]
fn zero_is_a_contributing_value() {
    let aggregate = mean_of_present([Some(0.0), Some(4.0)]);
    assert_eq!(aggregate.count, 2);
    assert_eq!(aggregate.value, Some(2.0));
}

#[test]
fn aggregate_of_nothing_is_null() {
    let aggregate = mean_of_present([None, None]);
    assert_eq!(aggregate.count, 0);
    assert_eq!(aggregate.value, None);

    assert_eq!(mean_of_present(std::iter::empty()).value, None);
}
