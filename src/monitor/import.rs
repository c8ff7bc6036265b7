use std::path::Path;

use chrono::TimeZone;

use crate::config::MetricConfig;
use crate::storage::{HistoryStore, LogScanner, PersistenceBackend, PersistenceError, ScanStats};

/// Append the points found in a legacy log file to the metric's history.
///
/// Lines are matched with the metric's `log_marker`; naive timestamps are
/// read in `tz`. Malformed lines are counted and skipped.
pub fn import_log<B: PersistenceBackend, Tz: TimeZone>(
    metric: &MetricConfig,
    history: &HistoryStore<B>,
    path: &Path,
    tz: Tz,
) -> Result<ScanStats, ImportError> {
    let text = std::fs::read_to_string(path)?;
    let scanner = LogScanner::new(&metric.log_marker, tz)?;
    let (points, stats) = scanner.scan(&text);

    history.extend_points(&metric.id, &points)?;

    tracing::info!(
        metric_id = %metric.id,
        lines = stats.lines,
        imported = stats.matched,
        skipped = stats.malformed,
        "Imported legacy log"
    );

    Ok(stats)
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read log: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid log marker: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to store history: {0}")]
    Store(#[from] PersistenceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::ThresholdRule;
    use crate::monitor::testing::{metric, stores};
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_import_appends_points() {
        let temp_dir = TempDir::new().unwrap();
        let (_, history) = stores(&temp_dir);
        let metric = metric(ThresholdRule::relative(0.015));

        let log_path = temp_dir.path().join("rate_exchange.log");
        std::fs::write(
            &log_path,
            "2025-03-01 08:00:00,001 - INFO - Previous: 146.0000, Current: 146.3400, Change: 0.23%\n\
             2025-03-01 08:00:00,002 - INFO - threshold not reached\n\
             2025-03-01 09:00:00,001 - INFO - Current: ???\n\
             2025-03-01 10:00:00,001 - INFO - Previous: 146.3400, Current: 147.0000, Change: 0.45%\n",
        )
        .unwrap();

        let stats = import_log(&metric, &history, &log_path, Utc).unwrap();
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.malformed, 1);

        let values: Vec<f64> = history
            .points("usdjpy", None)
            .unwrap()
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![146.34, 147.0]);
    }

    #[test]
    fn test_missing_log_file() {
        let temp_dir = TempDir::new().unwrap();
        let (_, history) = stores(&temp_dir);
        let metric = metric(ThresholdRule::relative(0.015));

        let result = import_log(&metric, &history, &temp_dir.path().join("nope.log"), Utc);
        assert!(matches!(result, Err(ImportError::Read(_))));
    }
}
