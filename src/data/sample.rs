use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value carried by a sample: a single number, or one number per sub-metric
/// (treasury tenors, for example).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SampleValue {
    #[serde(rename = "value")]
    Scalar(f64),
    #[serde(rename = "rates")]
    Series(BTreeMap<String, f64>),
}

impl SampleValue {
    /// Resolve the number a rule or summary looks at.
    ///
    /// Scalars answer only when no series is named; series answer only for a
    /// named key.
    pub fn get(&self, series: Option<&str>) -> Option<f64> {
        match (self, series) {
            (SampleValue::Scalar(v), None) => Some(*v),
            (SampleValue::Series(map), Some(key)) => map.get(key).copied(),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            SampleValue::Scalar(v) => Some(*v),
            SampleValue::Series(_) => None,
        }
    }

    /// True when every number is finite. JSON has no NaN or infinity, so
    /// anything else would not survive a save and reload.
    pub fn is_finite(&self) -> bool {
        match self {
            SampleValue::Scalar(v) => v.is_finite(),
            SampleValue::Series(map) => map.values().all(|v| v.is_finite()),
        }
    }
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleValue::Scalar(v) => write!(f, "{}", v),
            SampleValue::Series(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// One timestamped observation of a tracked metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub metric_id: String,
    pub value: SampleValue,
    pub observed_at: DateTime<Utc>,
}

impl MetricSample {
    pub fn scalar(metric_id: impl Into<String>, value: f64, observed_at: DateTime<Utc>) -> Self {
        Self {
            metric_id: metric_id.into(),
            value: SampleValue::Scalar(value),
            observed_at,
        }
    }

    pub fn series<K, I>(metric_id: impl Into<String>, rates: I, observed_at: DateTime<Utc>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self {
            metric_id: metric_id.into(),
            value: SampleValue::Series(rates.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            observed_at,
        }
    }

    /// Build from an on-disk record; the metric id is not stored in the record.
    pub fn from_record(metric_id: impl Into<String>, record: SampleRecord) -> Self {
        Self {
            metric_id: metric_id.into(),
            value: record.value,
            observed_at: record.timestamp,
        }
    }

    pub fn to_record(&self) -> SampleRecord {
        SampleRecord {
            value: self.value.clone(),
            timestamp: self.observed_at,
        }
    }
}

/// Persisted JSON shape:
/// `{"value": 1.5, "timestamp": "..."}` or `{"rates": {"10y": 4.4}, "timestamp": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    #[serde(flatten)]
    pub value: SampleValue,
    pub timestamp: DateTime<Utc>,
}

/// A single `(timestamp, value)` pair of a history window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl HistoryPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_scalar_record_shape() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let sample = MetricSample::scalar("usdjpy", 146.34, ts);

        let json = serde_json::to_value(sample.to_record()).unwrap();
        assert_eq!(json["value"], serde_json::json!(146.34));
        assert!(json["timestamp"].is_string());
        assert!(json.get("rates").is_none());
    }

    #[test]
    fn test_series_record_shape() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let sample = MetricSample::series("us_bonds", [("2y", 4.25), ("10y", 4.45)], ts);

        let text = serde_json::to_string(&sample.to_record()).unwrap();
        let record: SampleRecord = serde_json::from_str(&text).unwrap();
        let restored = MetricSample::from_record("us_bonds", record);

        assert_eq!(restored, sample);
        assert_eq!(restored.value.get(Some("10y")), Some(4.45));
        assert_eq!(restored.value.get(None), None);
    }

    #[test]
    fn test_float_survives_exactly() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let value = 0.1 + 0.2;
        let sample = MetricSample::scalar("btc", value, ts);

        let text = serde_json::to_string(&sample.to_record()).unwrap();
        let record: SampleRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(record.value.as_scalar().unwrap().to_bits(), value.to_bits());
        assert_eq!(record.timestamp, ts);
    }

    #[test]
    fn test_finiteness() {
        assert!(SampleValue::Scalar(146.34).is_finite());
        assert!(!SampleValue::Scalar(f64::NAN).is_finite());

        let rates = BTreeMap::from([("2y".to_string(), 4.25), ("10y".to_string(), f64::INFINITY)]);
        assert!(!SampleValue::Series(rates).is_finite());
    }
}
