//! CoinGecko spot price

use async_trait::async_trait;
use chrono::Utc;

use super::{get_json, SourceError, ValueSource};
use crate::data::MetricSample;

pub struct CoinGeckoSource {
    metric_id: String,
    url: String,
    coin: String,
    vs_currency: String,
    client: reqwest::Client,
}

impl CoinGeckoSource {
    pub fn new(
        metric_id: &str,
        base_url: &str,
        coin: &str,
        vs_currency: &str,
        client: reqwest::Client,
    ) -> Self {
        Self {
            metric_id: metric_id.to_string(),
            url: format!("{}/simple/price", base_url.trim_end_matches('/')),
            coin: coin.to_string(),
            vs_currency: vs_currency.to_string(),
            client,
        }
    }
}

#[async_trait]
impl ValueSource for CoinGeckoSource {
    async fn fetch(&self) -> Result<MetricSample, SourceError> {
        let body = get_json(
            &self.client,
            &self.url,
            &[
                ("ids", self.coin.as_str()),
                ("vs_currencies", self.vs_currency.as_str()),
            ],
        )
        .await?;

        let price = extract_price(&body, &self.coin, &self.vs_currency)?;
        tracing::info!(coin = %self.coin, "Price: {:.2} {}", price, self.vs_currency);

        Ok(MetricSample::scalar(&self.metric_id, price, Utc::now()))
    }
}

/// Pull `body[coin][vs_currency]` out of a simple-price response
pub fn extract_price(
    body: &serde_json::Value,
    coin: &str,
    vs_currency: &str,
) -> Result<f64, SourceError> {
    body.get(coin)
        .and_then(|c| c.get(vs_currency))
        .and_then(|p| p.as_f64())
        .ok_or_else(|| SourceError::Decode(format!("no {}/{} price in response", coin, vs_currency)))
}
