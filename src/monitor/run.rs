//! One check cycle: fetch, compare, decide, notify, persist

use crate::alerts::{decide, AlertEvent, Notify};
use crate::config::MetricConfig;
use crate::data::MetricSample;
use crate::source::{SourceError, ValueSource};
use crate::storage::{HistoryStore, PersistenceBackend, PersistenceError, StateStore};

use super::RunError;

/// Collaborators of a single check cycle for one metric
pub struct MonitorRun<'a, B> {
    metric: &'a MetricConfig,
    source: &'a dyn ValueSource,
    notifier: &'a dyn Notify,
    state: &'a StateStore<B>,
    history: &'a HistoryStore<B>,
}

/// What happened to the alert notification
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    NotNeeded,
    Sent,
    Failed(String),
}

/// Result of a completed cycle
#[derive(Debug)]
pub struct RunReport {
    pub sample: MetricSample,
    pub previous: Option<MetricSample>,
    pub alert: Option<AlertEvent>,
    pub delivery: Delivery,
}

impl<'a, B: PersistenceBackend> MonitorRun<'a, B> {
    pub fn new(
        metric: &'a MetricConfig,
        source: &'a dyn ValueSource,
        notifier: &'a dyn Notify,
        state: &'a StateStore<B>,
        history: &'a HistoryStore<B>,
    ) -> Self {
        Self {
            metric,
            source,
            notifier,
            state,
            history,
        }
    }

    /// Run the cycle.
    ///
    /// A fetch failure returns before any state is touched. Once a sample is
    /// fetched it is always persisted, even if the baseline turns out to be
    /// unusable; that case is still reported as `RunError::InvalidState`.
    pub async fn execute(&self) -> Result<RunReport, RunError> {
        let metric_id = self.metric.id.as_str();
        tracing::info!(metric_id = %metric_id, "Check started");

        let current = self
            .source
            .fetch()
            .await
            .and_then(|sample| {
                if sample.value.is_finite() {
                    Ok(sample)
                } else {
                    Err(SourceError::Decode(format!("non-finite value: {}", sample.value)))
                }
            })
            .map_err(|e| {
                tracing::error!(metric_id = %metric_id, error = %e, "Fetch failed, state left untouched");
                RunError::Fetch(e)
            })?;

        let (previous, mut invalid) = match self.state.load(metric_id) {
            Ok(previous) => (previous, None),
            Err(PersistenceError::Corrupted { key, reason }) => (
                None,
                Some(RunError::InvalidState(format!("corrupt state in {}: {}", key, reason))),
            ),
            Err(e) => return Err(RunError::Io(e)),
        };

        self.log_comparison(&current, previous.as_ref());

        let alert = if invalid.is_some() {
            None
        } else {
            match decide(&current, previous.as_ref(), &self.metric.rule) {
                Ok(alert) => alert,
                Err(e) => {
                    invalid = Some(RunError::InvalidState(e.to_string()));
                    None
                }
            }
        };

        let delivery = match &alert {
            Some(event) => self.deliver(event).await,
            None => {
                tracing::info!(metric_id = %metric_id, "Below threshold, no notification");
                Delivery::NotNeeded
            }
        };

        self.state.save(&current).map_err(RunError::Io)?;
        self.history.append(&current).map_err(RunError::Io)?;

        if let Some(err) = invalid {
            tracing::error!(metric_id = %metric_id, error = %err, "Baseline unusable, replaced with current sample");
            return Err(err);
        }

        tracing::info!(metric_id = %metric_id, "Check completed");

        Ok(RunReport {
            sample: current,
            previous,
            alert,
            delivery,
        })
    }

    async fn deliver(&self, event: &AlertEvent) -> Delivery {
        tracing::warn!(
            metric_id = %event.metric_id,
            direction = %event.direction,
            magnitude = event.change_magnitude,
            "{}",
            event.message_text
        );

        match self
            .notifier
            .send(&event.title(&self.metric.name), &event.message_text)
            .await
        {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                tracing::error!(
                    metric_id = %event.metric_id,
                    error = %e,
                    "Failed to send notification"
                );
                Delivery::Failed(e.to_string())
            }
        }
    }

    fn log_comparison(&self, current: &MetricSample, previous: Option<&MetricSample>) {
        let series = self.metric.rule.series();
        let metric_id = self.metric.id.as_str();

        let Some(now) = current.value.get(series) else {
            tracing::warn!(metric_id = %metric_id, series = ?series, "Sample has no value for the rule");
            return;
        };

        match previous.and_then(|p| p.value.get(series)) {
            Some(before) if before != 0.0 => tracing::info!(
                metric_id = %metric_id,
                "Previous: {:.4}, Current: {:.4}, Change: {:+.2}%",
                before,
                now,
                (now - before) / before * 100.0
            ),
            Some(before) => tracing::info!(
                metric_id = %metric_id,
                "Previous: {:.4}, Current: {:.4}",
                before,
                now
            ),
            None => tracing::info!(
                metric_id = %metric_id,
                "Current: {:.4}, no baseline yet",
                now
            ),
        }
    }
}
