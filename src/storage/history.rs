//! Append-only sample history
//!
//! One JSON record per line, in the same shape as the state file. The
//! summarizer reads this directly; log text is for humans only.

use super::persistence::{PersistenceBackend, PersistenceError};
use crate::data::{HistoryPoint, MetricSample, SampleRecord, SampleValue};

/// Per-metric time series of every persisted sample
pub struct HistoryStore<B> {
    backend: B,
}

impl<B: PersistenceBackend> HistoryStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn key(metric_id: &str) -> String {
        format!("{}.history.jsonl", metric_id)
    }

    /// Append one sample
    pub fn append(&self, sample: &MetricSample) -> Result<(), PersistenceError> {
        let line = serde_json::to_vec(&sample.to_record())
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        self.backend.append(&Self::key(&sample.metric_id), &line)
    }

    /// Read the `(timestamp, value)` series in file order.
    ///
    /// `series` picks a sub-metric of multi-series samples. Malformed lines
    /// and records without the requested value are skipped.
    pub fn points(
        &self,
        metric_id: &str,
        series: Option<&str>,
    ) -> Result<Vec<HistoryPoint>, PersistenceError> {
        let key = Self::key(metric_id);
        let Some(data) = self.backend.read(&key)? else {
            return Ok(Vec::new());
        };

        let mut points = Vec::new();
        let mut skipped = 0usize;

        for line in data.split(|b| *b == b'\n') {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<SampleRecord>(line) {
                Ok(record) => match record.value.get(series) {
                    Some(value) => points.push(HistoryPoint::new(record.timestamp, value)),
                    None => skipped += 1,
                },
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!(
                metric_id = %metric_id,
                skipped,
                "Skipped unreadable history records"
            );
        }

        Ok(points)
    }

    /// Append recovered points as scalar records
    pub fn extend_points(
        &self,
        metric_id: &str,
        points: &[HistoryPoint],
    ) -> Result<usize, PersistenceError> {
        for point in points {
            let sample = MetricSample {
                metric_id: metric_id.to_string(),
                value: SampleValue::Scalar(point.value),
                observed_at: point.timestamp,
            };
            self.append(&sample)?;
        }
        Ok(points.len())
    }
}
