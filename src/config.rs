//! Application configuration
//!
//! Loaded once at startup from a JSON file and passed down explicitly.
//!
//! Environment variables:
//! - PRICEWATCH_CONFIG: config file path (default: ./pricewatch.json)
//! - PRICEWATCH_STATE_DIR: overrides `state_dir`
//! - PRICEWATCH_PUSHOVER_TOKEN / PRICEWATCH_PUSHOVER_USER: fill Pushover credentials
//! - RUST_LOG: log filter (default: pricewatch=info)

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::alerts::{NotifyTarget, ThresholdRule};
use crate::source::SourceConfig;

pub const DEFAULT_CONFIG_PATH: &str = "./pricewatch.json";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding state and history files
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Optional log file, written in addition to stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub notify: NotifyConfig,
    pub metrics: Vec<MetricConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub targets: Vec<NotifyTarget>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            targets: vec![NotifyTarget::Log],
        }
    }
}

/// One tracked metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Identifier, also the state file name
    pub id: String,
    /// Display name used in notifications
    pub name: String,
    /// Unit shown next to values ("USD", "%", ...)
    #[serde(default)]
    pub unit: String,
    pub source: SourceConfig,
    pub rule: ThresholdRule,
    /// HTTP timeout for the source
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Marker token used when importing legacy logs
    #[serde(default = "default_log_marker")]
    pub log_marker: String,
}

impl MetricConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Format a value with this metric's unit
    pub fn display(&self, value: f64) -> String {
        match self.unit.as_str() {
            "" => format!("{:.2}", value),
            "%" => format!("{:.3}%", value),
            unit => format!("{:.2} {}", value, unit),
        }
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./pricewatch_data")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_marker() -> String {
    "Current:".to_string()
}

impl AppConfig {
    /// Resolve the config path: explicit argument, then PRICEWATCH_CONFIG, then the default
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("PRICEWATCH_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Read, parse, apply environment overrides and validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config = Self::from_json(&text)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }

    /// Environment values win over the file
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("PRICEWATCH_STATE_DIR") {
            self.state_dir = PathBuf::from(dir);
        }
        let token = std::env::var("PRICEWATCH_PUSHOVER_TOKEN").ok();
        let user = std::env::var("PRICEWATCH_PUSHOVER_USER").ok();
        self.fill_pushover(token.as_deref(), user.as_deref());
    }

    fn fill_pushover(&mut self, token: Option<&str>, user: Option<&str>) {
        for target in &mut self.notify.targets {
            if let NotifyTarget::Pushover {
                api_token,
                user_key,
            } = target
            {
                if let Some(t) = token {
                    *api_token = t.to_string();
                }
                if let Some(u) = user {
                    *user_key = u.to_string();
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics.is_empty() {
            return Err(ConfigError::Invalid("no metrics configured".to_string()));
        }

        let mut seen = HashSet::new();
        for metric in &self.metrics {
            if metric.id.is_empty()
                || !metric
                    .id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(ConfigError::Invalid(format!(
                    "metric id {:?} must be non-empty and use only [A-Za-z0-9_-]",
                    metric.id
                )));
            }
            if !seen.insert(metric.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate metric id {}",
                    metric.id
                )));
            }
            let limit = metric.rule.limit();
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "metric {}: threshold must be positive, got {}",
                    metric.id, limit
                )));
            }
            if metric.timeout_secs == 0 {
                return Err(ConfigError::Invalid(format!(
                    "metric {}: timeout_secs must be positive",
                    metric.id
                )));
            }
        }

        Ok(())
    }

    pub fn metric(&self, id: &str) -> Option<&MetricConfig> {
        self.metrics.iter().find(|m| m.id == id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "state_dir": "/tmp/pricewatch",
        "notify": {"targets": [{"type": "Log"}, {"type": "Pushover"}]},
        "metrics": [
            {
                "id": "usdjpy",
                "name": "USD/JPY",
                "source": {"kind": "exchange_rate", "url": "https://example.test/latest/USD", "quote": "JPY"},
                "rule": {"kind": "relative", "threshold": 0.015}
            },
            {
                "id": "us_bonds",
                "name": "US Treasury",
                "unit": "%",
                "source": {"kind": "fixed", "rates": {"10-Year Treasury": 4.45}},
                "rule": {"kind": "absolute", "bound": 5.0, "series": "10-Year Treasury"},
                "log_marker": "10-Year Treasury:"
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_defaults() {
        let config = AppConfig::from_json(SAMPLE).unwrap();
        config.validate().unwrap();

        let fx = config.metric("usdjpy").unwrap();
        assert_eq!(fx.timeout_secs, 30);
        assert_eq!(fx.log_marker, "Current:");
        assert_eq!(fx.rule, ThresholdRule::relative(0.015));

        let bonds = config.metric("us_bonds").unwrap();
        assert_eq!(bonds.rule.series(), Some("10-Year Treasury"));
        assert_eq!(bonds.display(4.45), "4.450%");
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_pushover_credentials_fill() {
        let mut config = AppConfig::from_json(SAMPLE).unwrap();
        config.fill_pushover(Some("token"), Some("user"));

        assert!(matches!(
            &config.notify.targets[1],
            NotifyTarget::Pushover { api_token, user_key } if api_token == "token" && user_key == "user"
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::from_json(SAMPLE).unwrap();
        config.metrics[1].id = "usdjpy".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::from_json(SAMPLE).unwrap();
        config.metrics[0].id = "../escape".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::from_json(SAMPLE).unwrap();
        config.metrics[0].rule = ThresholdRule::relative(0.0);
        assert!(config.validate().is_err());

        let mut config = AppConfig::from_json(SAMPLE).unwrap();
        config.metrics.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_notify_target_is_log() {
        let config = AppConfig::from_json(
            r#"{"metrics": [{"id": "btc", "name": "Bitcoin", "unit": "USD",
                "source": {"kind": "coin_gecko", "coin": "bitcoin", "vs_currency": "usd"},
                "rule": {"kind": "relative", "threshold": 0.05}}]}"#,
        )
        .unwrap();

        assert!(matches!(config.notify.targets[..], [NotifyTarget::Log]));
        assert_eq!(config.state_dir, PathBuf::from("./pricewatch_data"));
        assert_eq!(config.metrics[0].display(64000.0), "64000.00 USD");
    }
}
