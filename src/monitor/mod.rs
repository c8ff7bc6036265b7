//! Monitoring entry points: the check cycle, the morning report and the
//! history helpers behind the CLI.

pub mod import;
pub mod report;
pub mod run;

pub use import::{import_log, ImportError};
pub use report::{history_overview, HistoryOverview, MorningReport, ReportOutcome};
pub use run::{Delivery, MonitorRun, RunReport};

use crate::source::SourceError;
use crate::storage::PersistenceError;

/// Run-level errors. Anything returned here ends the process non-zero.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Talking to the value source failed; state was not touched
    #[error("Fetch failed: {0}")]
    Fetch(#[from] SourceError),

    /// The stored baseline cannot be used for comparison
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// State or history could not be read or written
    #[error("Storage failed: {0}")]
    Io(#[from] PersistenceError),
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use tempfile::TempDir;

    use crate::alerts::{NotifierError, Notify, ThresholdRule};
    use crate::config::MetricConfig;
    use crate::data::{MetricSample, SampleValue};
    use crate::source::{SourceConfig, SourceError, ValueSource};
    use crate::storage::{FileBackend, HistoryStore, PersistenceConfig, StateStore};

    pub fn metric(rule: ThresholdRule) -> MetricConfig {
        MetricConfig {
            id: "usdjpy".to_string(),
            name: "USD/JPY".to_string(),
            unit: String::new(),
            source: SourceConfig::Fixed {
                value: Some(1.0),
                rates: Default::default(),
            },
            rule,
            timeout_secs: 30,
            log_marker: "Current:".to_string(),
        }
    }

    pub fn stores(dir: &TempDir) -> (StateStore<FileBackend>, HistoryStore<FileBackend>) {
        let config = PersistenceConfig::new(dir.path()).with_sync_writes(false);
        (
            StateStore::new(FileBackend::new(config.clone()).unwrap()),
            HistoryStore::new(FileBackend::new(config).unwrap()),
        )
    }

    /// Source returning a fixed value, or failing
    pub struct FakeSource {
        metric_id: &'static str,
        value: Option<SampleValue>,
    }

    impl FakeSource {
        pub fn value(v: f64) -> Self {
            Self {
                metric_id: "usdjpy",
                value: Some(SampleValue::Scalar(v)),
            }
        }

        pub fn series(rates: &[(&str, f64)]) -> Self {
            Self {
                metric_id: "us_bonds",
                value: Some(SampleValue::Series(
                    rates.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                )),
            }
        }

        pub fn failing() -> Self {
            Self {
                metric_id: "usdjpy",
                value: None,
            }
        }
    }

    #[async_trait]
    impl ValueSource for FakeSource {
        async fn fetch(&self) -> Result<MetricSample, SourceError> {
            match &self.value {
                Some(value) => Ok(MetricSample {
                    metric_id: self.metric_id.to_string(),
                    value: value.clone(),
                    observed_at: Utc::now(),
                }),
                None => Err(SourceError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }
    }

    /// Notifier recording `(title, message)` pairs
    pub struct FakeNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl FakeNotifier {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl Notify for FakeNotifier {
        async fn send(&self, title: &str, message: &str) -> Result<(), NotifierError> {
            if self.fail {
                return Err(NotifierError::Webhook("connection refused".to_string()));
            }
            self.sent.lock().push((title.to_string(), message.to_string()));
            Ok(())
        }
    }
}
