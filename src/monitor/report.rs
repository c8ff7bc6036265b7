//! Morning report and history overview

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone, Utc};

use crate::alerts::policy::relative_change;
use crate::alerts::Notify;
use crate::config::MetricConfig;
use crate::data::{HistoryPoint, MetricSample, SampleValue};
use crate::query::{moving_average, summarize, summarize_range, InsufficientData, WindowSummary};
use crate::source::ValueSource;
use crate::storage::{HistoryStore, PersistenceBackend, StateStore};

use super::run::Delivery;
use super::RunError;

/// Summarize-and-report mode: reads state and history, never writes them
pub struct MorningReport<'a, B> {
    metric: &'a MetricConfig,
    source: &'a dyn ValueSource,
    notifier: &'a dyn Notify,
    state: &'a StateStore<B>,
    history: &'a HistoryStore<B>,
}

/// What the report contained and whether it went out
#[derive(Debug)]
pub struct ReportOutcome {
    pub message: String,
    pub yesterday: Result<WindowSummary, InsufficientData>,
    pub delivery: Delivery,
}

impl<'a, B: PersistenceBackend> MorningReport<'a, B> {
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

    /// Build and send the report as of `now`. "Yesterday" is the calendar day
    /// before `now` in `now`'s time zone.
    pub async fn execute<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Result<ReportOutcome, RunError> {
        let metric_id = self.metric.id.as_str();
        tracing::info!(metric_id = %metric_id, "Morning report started");

        let current = self.source.fetch().await.map_err(|e| {
            tracing::error!(metric_id = %metric_id, error = %e, "Fetch failed");
            RunError::Fetch(e)
        })?;

        let baseline = match self.state.load(metric_id) {
            Ok(baseline) => baseline,
            Err(e) => {
                tracing::warn!(metric_id = %metric_id, error = %e, "Baseline unreadable, reporting without it");
                None
            }
        };

        let series = self.metric.rule.series();
        let today = now.date_naive();
        let yesterday_date = today.pred_opt().unwrap_or(today);
        let (yesterday, history_ok) = match self.history.points(metric_id, series) {
            Ok(points) => (summarize(&points, yesterday_date, &now.timezone()), true),
            Err(e) => {
                tracing::error!(metric_id = %metric_id, error = %e, "Failed to read history");
                (Err(InsufficientData::NoSamples), false)
            }
        };

        let mut message = String::new();
        let _ = writeln!(message, "Good morning! {} report", self.metric.name);
        let _ = writeln!(message);
        let _ = writeln!(message, "Time: {}", now.naive_local().format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(message);
        self.write_current(&mut message, &current, baseline.as_ref());
        let _ = writeln!(message);
        if history_ok {
            self.write_yesterday(&mut message, yesterday_date, &yesterday);
        } else {
            let _ = writeln!(message, "Yesterday ({}): history could not be read", yesterday_date);
        }
        let _ = writeln!(message);
        let _ = write!(message, "Alert rule: {}", self.metric.rule.describe());

        let title = format!("{} morning report", self.metric.name);
        let delivery = match self.notifier.send(&title, &message).await {
            Ok(()) => Delivery::Sent,
            Err(e) => {
                tracing::error!(metric_id = %metric_id, error = %e, "Failed to send morning report");
                Delivery::Failed(e.to_string())
            }
        };

        tracing::info!(metric_id = %metric_id, "Morning report finished");

        Ok(ReportOutcome {
            message,
            yesterday,
            delivery,
        })
    }

    fn write_current(&self, out: &mut String, current: &MetricSample, baseline: Option<&MetricSample>) {
        match &current.value {
            SampleValue::Scalar(v) => {
                let _ = writeln!(out, "Current: {}", self.metric.display(*v));
            }
            SampleValue::Series(rates) => {
                let _ = writeln!(out, "Current:");
                for (name, v) in rates {
                    let _ = writeln!(out, "- {}: {}", name, self.metric.display(*v));
                }
            }
        }

        let series = self.metric.rule.series();
        let before = baseline.and_then(|b| b.value.get(series));
        let now = current.value.get(series);
        if let (Some(before), Some(now)) = (before, now) {
            if let Ok(change) = relative_change(before, now) {
                let _ = writeln!(out, "Change since last check: {:+.2}%", change * 100.0);
            }
        }
    }

    fn write_yesterday(
        &self,
        out: &mut String,
        date: chrono::NaiveDate,
        yesterday: &Result<WindowSummary, InsufficientData>,
    ) {
        match yesterday {
            Ok(summary) => {
                let _ = writeln!(out, "Yesterday ({}):", date);
                let _ = writeln!(out, "Start: {}", self.metric.display(summary.start));
                let _ = writeln!(out, "End: {}", self.metric.display(summary.end));
                let _ = writeln!(out, "High: {}", self.metric.display(summary.max));
                let _ = writeln!(out, "Low: {}", self.metric.display(summary.min));
                if let Some(change) = summary.change_percent {
                    let _ = writeln!(out, "Change: {:+.2}%", change);
                }
                let _ = writeln!(out, "Data points: {}", summary.points);
            }
            Err(InsufficientData::NoSamples) => {
                let _ = writeln!(out, "Yesterday ({}): no data recorded", date);
            }
            Err(InsufficientData::SingleSample) => {
                let _ = writeln!(out, "Yesterday ({}): not enough data (1 point)", date);
            }
        }
    }
}

/// Whole-period statistics plus the moving averages a price chart overlays
#[derive(Debug)]
pub struct HistoryOverview {
    pub summary: Result<WindowSummary, InsufficientData>,
    /// First and last timestamps of the series
    pub period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub ma7: Option<f64>,
    pub ma25: Option<f64>,
}

pub fn history_overview(points: &[HistoryPoint]) -> HistoryOverview {
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let latest = |period| moving_average(&values, period).last().copied().flatten();

    HistoryOverview {
        summary: summarize_range(points),
        period: points.first().zip(points.last()).map(|(a, b)| (a.timestamp, b.timestamp)),
        ma7: latest(7),
        ma25: latest(25),
    }
}

impl HistoryOverview {
    pub fn render(&self, metric: &MetricConfig) -> String {
        let mut out = String::new();
        match &self.summary {
            Ok(s) => {
                let _ = writeln!(out, "{} history ({} points)", metric.name, s.points);
                if let Some((start, end)) = self.period {
                    let _ = writeln!(
                        out,
                        "Period: {} to {}",
                        start.format("%Y-%m-%d %H:%M UTC"),
                        end.format("%Y-%m-%d %H:%M UTC")
                    );
                }
                let _ = writeln!(out, "Latest: {}", metric.display(s.end));
                if let Some(change) = s.change_percent {
                    let _ = writeln!(out, "Period change: {:+.2}%", change);
                }
                let _ = writeln!(out, "Average: {}", metric.display(s.mean));
                let _ = writeln!(out, "High: {}", metric.display(s.max));
                let _ = writeln!(out, "Low: {}", metric.display(s.min));
            }
            Err(e) => {
                let _ = writeln!(out, "{} history: {}", metric.name, e);
            }
        }
        for (label, value) in [("MA7", self.ma7), ("MA25", self.ma25)] {
            if let Some(v) = value {
                let _ = writeln!(out, "{}: {}", label, metric.display(v));
            }
        }
        out
    }
}
