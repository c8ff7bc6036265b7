//! Last-known sample per tracked metric

use super::persistence::{PersistenceBackend, PersistenceError};
use crate::data::{MetricSample, SampleRecord};

/// Durable `metric_id -> last sample` map, one file per metric.
///
/// Single writer per metric: overlapping runs on the same metric lose an
/// update (last writer wins).
pub struct StateStore<B> {
    backend: B,
}

impl<B: PersistenceBackend> StateStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn key(metric_id: &str) -> String {
        format!("{}.json", metric_id)
    }

    /// Load the previous sample. `Ok(None)` on first run.
    pub fn load(&self, metric_id: &str) -> Result<Option<MetricSample>, PersistenceError> {
        let key = Self::key(metric_id);
        let Some(data) = self.backend.read(&key)? else {
            return Ok(None);
        };

        let record: SampleRecord =
            serde_json::from_slice(&data).map_err(|e| PersistenceError::Corrupted {
                key,
                reason: e.to_string(),
            })?;

        Ok(Some(MetricSample::from_record(metric_id, record)))
    }

    /// Replace the stored sample for `sample.metric_id`
    pub fn save(&self, sample: &MetricSample) -> Result<(), PersistenceError> {
        let data = serde_json::to_vec_pretty(&sample.to_record())
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        self.backend.write(&Self::key(&sample.metric_id), &data)
    }
}
