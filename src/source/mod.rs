//! Value sources: where the current sample of a metric comes from

pub mod coingecko;
pub mod exchange_rate;
pub mod fixed;
pub mod fred;
pub mod synthetic;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::MetricSample;

pub use coingecko::CoinGeckoSource;
pub use exchange_rate::ExchangeRateSource;
pub use fixed::FixedSource;
pub use fred::FredSource;

/// Returns the current value(s) of one tracked metric
#[async_trait]
pub trait ValueSource: Send + Sync {
    async fn fetch(&self) -> Result<MetricSample, SourceError>;
}

/// Source definition as it appears in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// CoinGecko simple price endpoint
    CoinGecko {
        #[serde(default = "default_coingecko_url")]
        base_url: String,
        coin: String,
        vs_currency: String,
    },
    /// Any endpoint answering `{"rates": {"JPY": 146.3, ...}}`
    ExchangeRate { url: String, quote: String },
    /// FRED series observations, one series per sub-metric
    Fred {
        #[serde(default = "default_fred_url")]
        base_url: String,
        #[serde(default)]
        api_key: String,
        series: BTreeMap<String, String>,
    },
    /// Configured constants standing in for a real feed
    Fixed {
        #[serde(default)]
        value: Option<f64>,
        #[serde(default)]
        rates: BTreeMap<String, f64>,
    },
}

fn default_coingecko_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_fred_url() -> String {
    "https://api.stlouisfed.org/fred".to_string()
}

/// Build the source for one metric
pub fn build_source(
    metric_id: &str,
    config: &SourceConfig,
    timeout: Duration,
) -> Result<Box<dyn ValueSource>, SourceError> {
    let source: Box<dyn ValueSource> = match config {
        SourceConfig::CoinGecko {
            base_url,
            coin,
            vs_currency,
        } => Box::new(CoinGeckoSource::new(
            metric_id,
            base_url,
            coin,
            vs_currency,
            http_client(timeout)?,
        )),
        SourceConfig::ExchangeRate { url, quote } => Box::new(ExchangeRateSource::new(
            metric_id,
            url,
            quote,
            http_client(timeout)?,
        )),
        SourceConfig::Fred {
            base_url,
            api_key,
            series,
        } => Box::new(FredSource::new(
            metric_id,
            base_url,
            api_key,
            series.clone(),
            http_client(timeout)?,
        )),
        SourceConfig::Fixed { value, rates } => {
            Box::new(FixedSource::new(metric_id, *value, rates.clone())?)
        }
    };
    Ok(source)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(SourceError::Network)
}

/// GET `url` and decode the JSON body
pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<serde_json::Value, SourceError> {
    tracing::debug!(url = %url, "Fetching");

    let response = client.get(url).query(query).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

/// Fetch errors. Transport errors are wrapped, not flattened.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Source returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Invalid source configuration: {0}")]
    Config(String),
}
