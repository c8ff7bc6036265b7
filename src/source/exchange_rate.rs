//! FX rate from a `{"rates": {...}}` style endpoint

use async_trait::async_trait;
use chrono::Utc;

use super::{get_json, SourceError, ValueSource};
use crate::data::MetricSample;

pub struct ExchangeRateSource {
    metric_id: String,
    url: String,
    quote: String,
    client: reqwest::Client,
}

impl ExchangeRateSource {
    pub fn new(metric_id: &str, url: &str, quote: &str, client: reqwest::Client) -> Self {
        Self {
            metric_id: metric_id.to_string(),
            url: url.to_string(),
            quote: quote.to_string(),
            client,
        }
    }
}

#[async_trait]
impl ValueSource for ExchangeRateSource {
    async fn fetch(&self) -> Result<MetricSample, SourceError> {
        let body = get_json(&self.client, &self.url, &[]).await?;
        let rate = extract_rate(&body, &self.quote)?;
        tracing::info!(quote = %self.quote, "Rate: {}", rate);

        Ok(MetricSample::scalar(&self.metric_id, rate, Utc::now()))
    }
}

pub fn extract_rate(body: &serde_json::Value, quote: &str) -> Result<f64, SourceError> {
    body.get("rates")
        .and_then(|r| r.get(quote))
        .and_then(|v| v.as_f64())
        .ok_or_else(|| SourceError::Decode(format!("no rate for {} in response", quote)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_rate() {
        let body = json!({"base": "USD", "rates": {"JPY": 146.34, "EUR": 0.92}});
        assert_eq!(extract_rate(&body, "JPY").unwrap(), 146.34);
        assert!(extract_rate(&body, "GBP").is_err());
        assert!(extract_rate(&json!({"rates": {"JPY": "146"}}), "JPY").is_err());
    }
}
