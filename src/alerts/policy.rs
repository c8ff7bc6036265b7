//! Alert decision policy
//!
//! Pure comparison of a fresh sample against its baseline. Nothing here
//! touches the network or the state store.

use super::config::{AlertEvent, Direction, ThresholdRule};
use crate::data::MetricSample;

/// Decide whether `current` fires an alert under `rule`.
///
/// Returns `Ok(None)` when the rule does not fire or cannot be evaluated yet:
/// no baseline for a relative rule, or the designated value missing from the
/// current sample or not finite. Threshold comparisons are inclusive.
pub fn decide(
    current: &MetricSample,
    previous: Option<&MetricSample>,
    rule: &ThresholdRule,
) -> Result<Option<AlertEvent>, PolicyError> {
    let series = rule.series();
    let Some(current_value) = current.value.get(series).filter(|v| v.is_finite()) else {
        return Ok(None);
    };

    match rule {
        ThresholdRule::Relative { threshold, .. } => {
            let Some(previous_value) = previous.and_then(|p| p.value.get(series)) else {
                return Ok(None);
            };
            let change = relative_change(previous_value, current_value)?;
            if change.abs() < *threshold {
                return Ok(None);
            }

            let direction = if change > 0.0 { Direction::Up } else { Direction::Down };
            let message_text = format!(
                "{} {}: {:+.2}%\nCurrent: {:.2}\nPrevious: {:.2}",
                label(current, series),
                direction,
                change * 100.0,
                current_value,
                previous_value
            );

            Ok(Some(AlertEvent {
                metric_id: current.metric_id.clone(),
                direction,
                current_value,
                previous_value: Some(previous_value),
                change_magnitude: change.abs(),
                message_text,
            }))
        }
        ThresholdRule::Absolute { bound, .. } => {
            if current_value < *bound {
                return Ok(None);
            }

            let message_text = format!(
                "{} reached {:.3} (threshold {:.1})",
                label(current, series),
                current_value,
                bound
            );

            Ok(Some(AlertEvent {
                metric_id: current.metric_id.clone(),
                direction: Direction::OverThreshold,
                current_value,
                previous_value: None,
                change_magnitude: current_value - bound,
                message_text,
            }))
        }
    }
}

/// Fractional change from `previous` to `current`.
///
/// A zero or non-finite baseline cannot anchor a relative comparison.
pub fn relative_change(previous: f64, current: f64) -> Result<f64, PolicyError> {
    if previous == 0.0 || !previous.is_finite() {
        return Err(PolicyError::ZeroBaseline(previous));
    }
    Ok((current - previous) / previous)
}

fn label<'a>(sample: &'a MetricSample, series: Option<&'a str>) -> &'a str {
    series.unwrap_or(&sample.metric_id)
}

/// Policy errors
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Baseline value {0} cannot anchor a relative threshold")]
    ZeroBaseline(f64),
}
