use serde_json::Value;

/// Numeric value of a time-series property that passed the existence filter.
///
/// Numbers and numeric strings convert; a present-but-null value reads as
/// `0.0`; anything else (booleans, objects, non-numeric text) is `None` and
/// the reading is dropped from the series.
#[must_use]
pub fn series_value(raw: &Value) -> Option<f64> {
    match raw {
        Value::Null => Some(0.0),
        other => numeric(other),
    }
}

/// Numeric value of a latest-projection property. Absent and null values are
/// `None` so they stay out of the aggregate.
#[must_use]
pub fn latest_value(raw: Option<&Value>) -> Option<f64> {
    raw.and_then(numeric)
}

fn numeric(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    /// Mean of the present values, `None` when nothing contributed.
    pub value: Option<f64>,
    /// Number of values that contributed.
    pub count: usize,
}

/// Arithmetic mean over the `Some` values only.
pub fn mean_of_present<I>(values: I) -> Aggregate
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));

    #[allow(clippy::cast_precision_loss)]
    let value = (count > 0).then(|| sum / count as f64);

    Aggregate { value, count }
}
