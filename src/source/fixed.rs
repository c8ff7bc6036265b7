//! Constant values from the config file.
//!
//! Stand-in for metrics without a live feed; every fetch returns the same
//! numbers stamped with the current time.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;

use super::{SourceError, ValueSource};
use crate::data::{MetricSample, SampleValue};

pub struct FixedSource {
    metric_id: String,
    value: SampleValue,
}

impl FixedSource {
    /// Exactly one of `value` and `rates` must be given
    pub fn new(
        metric_id: &str,
        value: Option<f64>,
        rates: BTreeMap<String, f64>,
    ) -> Result<Self, SourceError> {
        let value = match (value, rates.is_empty()) {
            (Some(v), true) => SampleValue::Scalar(v),
            (None, false) => SampleValue::Series(rates),
            _ => {
                return Err(SourceError::Config(format!(
                    "fixed source for {} needs exactly one of value or rates",
                    metric_id
                )))
            }
        };
        if !value.is_finite() {
            return Err(SourceError::Config(format!(
                "fixed source for {} has a non-finite value",
                metric_id
            )));
        }
        Ok(Self {
            metric_id: metric_id.to_string(),
            value,
        })
    }
}

#[async_trait]
impl ValueSource for FixedSource {
    async fn fetch(&self) -> Result<MetricSample, SourceError> {
        tracing::info!(metric_id = %self.metric_id, "Fixed values: {}", self.value);
        Ok(MetricSample {
            metric_id: self.metric_id.clone(),
            value: self.value.clone(),
            observed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_series() {
        let rates = BTreeMap::from([("10-Year Treasury".to_string(), 4.45)]);
        let source = FixedSource::new("us_bonds", None, rates).unwrap();

        let sample = source.fetch().await.unwrap();
        assert_eq!(sample.metric_id, "us_bonds");
        assert_eq!(sample.value.get(Some("10-Year Treasury")), Some(4.45));
    }

    #[test]
    fn test_needs_exactly_one_shape() {
        assert!(FixedSource::new("x", None, BTreeMap::new()).is_err());
        let rates = BTreeMap::from([("a".to_string(), 1.0)]);
        assert!(FixedSource::new("x", Some(1.0), rates).is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        assert!(FixedSource::new("x", Some(f64::NAN), BTreeMap::new()).is_err());
        let rates = BTreeMap::from([("10y".to_string(), f64::INFINITY)]);
        assert!(FixedSource::new("x", None, rates).is_err());
    }
}
