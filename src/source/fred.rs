//! Treasury yields from FRED series observations

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;

use super::{get_json, SourceError, ValueSource};
use crate::data::{MetricSample, SampleValue};

/// Latest observation of each configured series, as one multi-series sample
pub struct FredSource {
    metric_id: String,
    url: String,
    api_key: String,
    /// sub-metric name -> FRED series id
    series: BTreeMap<String, String>,
    client: reqwest::Client,
}

impl FredSource {
    pub fn new(
        metric_id: &str,
        base_url: &str,
        api_key: &str,
        series: BTreeMap<String, String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            metric_id: metric_id.to_string(),
            url: format!("{}/series/observations", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            series,
            client,
        }
    }
}

#[async_trait]
impl ValueSource for FredSource {
    async fn fetch(&self) -> Result<MetricSample, SourceError> {
        if self.api_key.is_empty() {
            return Err(SourceError::Config("FRED api_key is not set".to_string()));
        }

        let mut rates = BTreeMap::new();
        for (name, series_id) in &self.series {
            let body = get_json(
                &self.client,
                &self.url,
                &[
                    ("series_id", series_id.as_str()),
                    ("api_key", self.api_key.as_str()),
                    ("file_type", "json"),
                    ("sort_order", "desc"),
                    ("limit", "1"),
                ],
            )
            .await?;

            let (date, rate) = extract_latest(&body)?;
            tracing::info!(series = %series_id, "{}: {:.3}% ({})", name, rate, date);
            rates.insert(name.clone(), rate);
        }

        Ok(MetricSample {
            metric_id: self.metric_id.clone(),
            value: SampleValue::Series(rates),
            observed_at: Utc::now(),
        })
    }
}

/// Newest `(date, value)` of an observations response. FRED writes `"."` for
/// days without data.
pub fn extract_latest(body: &serde_json::Value) -> Result<(String, f64), SourceError> {
    let observation = body
        .get("observations")
        .and_then(|o| o.as_array())
        .and_then(|o| o.first())
        .ok_or_else(|| SourceError::Decode("no observations in response".to_string()))?;

    let date = observation
        .get("date")
        .and_then(|d| d.as_str())
        .unwrap_or_default()
        .to_string();
    let raw = observation
        .get("value")
        .and_then(|v| v.as_str())
        .ok_or_else(|| SourceError::Decode("observation without value".to_string()))?;
    let value = raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SourceError::Decode(format!("unusable observation value {:?}", raw)))?;

    Ok((date, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_latest() {
        let body = json!({"observations": [{"date": "2025-03-03", "value": "4.45"}]});
        let (date, value) = extract_latest(&body).unwrap();
        assert_eq!(date, "2025-03-03");
        assert_eq!(value, 4.45);
    }

    #[test]
    fn test_missing_marker_is_decode_error() {
        let body = json!({"observations": [{"date": "2025-03-03", "value": "."}]});
        assert!(matches!(extract_latest(&body), Err(SourceError::Decode(_))));
        assert!(extract_latest(&json!({"observations": []})).is_err());
    }

    #[test]
    fn test_non_finite_value_is_decode_error() {
        for raw in ["NaN", "inf", "-infinity"] {
            let body = json!({"observations": [{"date": "2025-03-03", "value": raw}]});
            assert!(matches!(extract_latest(&body), Err(SourceError::Decode(_))), "{}", raw);
        }
    }
}
