//! Window summaries over a time-ordered series
//!
//! Input order is a precondition: points must already be chronological.
//! Nothing here re-sorts.

use chrono::{NaiveDate, TimeZone};

use crate::data::HistoryPoint;

/// Running start/end/min/max/sum over values in arrival order
#[derive(Debug, Clone, Default)]
pub struct WindowAccumulator {
    start: Option<f64>,
    end: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    count: usize,
}

impl WindowAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; non-finite values are ignored
    pub fn accumulate(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.start.get_or_insert(value);
        self.end = Some(value);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value;
        self.count += 1;
    }

    /// Finish the window. Needs at least two values.
    pub fn finish(&self) -> Result<WindowSummary, InsufficientData> {
        match (self.count, self.start, self.end, self.min, self.max) {
            (0, ..) => Err(InsufficientData::NoSamples),
            (1, ..) => Err(InsufficientData::SingleSample),
            (points, Some(start), Some(end), Some(min), Some(max)) => Ok(WindowSummary {
                start,
                end,
                min,
                max,
                mean: self.sum / points as f64,
                points,
                change_percent: percent_change(start, end),
            }),
            _ => Err(InsufficientData::NoSamples),
        }
    }
}

/// Summary of one window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSummary {
    pub start: f64,
    pub end: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub points: usize,
    /// `(end - start) / start * 100`; `None` when `start` is zero
    pub change_percent: Option<f64>,
}

/// Why a window could not be summarized. A normal outcome, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InsufficientData {
    #[error("no samples in window")]
    NoSamples,
    #[error("only one sample in window")]
    SingleSample,
}

fn percent_change(start: f64, end: f64) -> Option<f64> {
    if start == 0.0 {
        None
    } else {
        Some((end - start) / start * 100.0)
    }
}

/// Summarize the points falling on calendar day `date` as seen in `tz`.
///
/// "Yesterday" for the morning report is `date = today_local - 1 day`; this is
/// a calendar boundary, not a rolling 24 hours.
pub fn summarize<Tz: TimeZone>(
    points: &[HistoryPoint],
    date: NaiveDate,
    tz: &Tz,
) -> Result<WindowSummary, InsufficientData> {
    let mut acc = WindowAccumulator::new();
    for point in points
        .iter()
        .filter(|p| p.timestamp.with_timezone(tz).date_naive() == date)
    {
        acc.accumulate(point.value);
    }
    acc.finish()
}

/// Summarize a whole series (the chart period)
pub fn summarize_range(points: &[HistoryPoint]) -> Result<WindowSummary, InsufficientData> {
    let mut acc = WindowAccumulator::new();
    for point in points {
        acc.accumulate(point.value);
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn at(day: u32, hour: u32, value: f64) -> HistoryPoint {
        HistoryPoint::new(Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap(), value)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_day_summary() {
        let points = vec![at(2, 8, 100.0), at(2, 12, 103.0), at(2, 20, 97.0)];

        let summary = summarize(&points, day(2), &Utc).unwrap();
        assert_eq!(summary.start, 100.0);
        assert_eq!(summary.end, 97.0);
        assert_eq!(summary.min, 97.0);
        assert_eq!(summary.max, 103.0);
        assert_eq!(summary.points, 3);
        assert!((summary.mean - 100.0).abs() < 1e-9);
        assert!((summary.change_percent.unwrap() - -3.0).abs() < 1e-9);
    }

    #[test]
    fn test_other_days_are_excluded() {
        let points = vec![
            at(1, 23, 500.0),
            at(2, 1, 100.0),
            at(2, 22, 110.0),
            at(3, 0, 1.0),
        ];

        let summary = summarize(&points, day(2), &Utc).unwrap();
        assert_eq!(summary.start, 100.0);
        assert_eq!(summary.end, 110.0);
        assert_eq!(summary.points, 2);
    }

    #[test]
    fn test_insufficient_data_is_distinguished() {
        let points = vec![at(1, 8, 100.0), at(2, 8, 101.0)];

        assert_eq!(
            summarize(&points, day(2), &Utc),
            Err(InsufficientData::SingleSample)
        );
        assert_eq!(
            summarize(&points, day(5), &Utc),
            Err(InsufficientData::NoSamples)
        );
        assert_eq!(summarize(&[], day(2), &Utc), Err(InsufficientData::NoSamples));
    }

    #[test]
    fn test_day_boundary_follows_timezone() {
        // 2025-03-01 20:00 UTC is 2025-03-02 05:00 in UTC+9
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let points = vec![at(1, 20, 150.0), at(2, 3, 151.0)];

        let summary = summarize(&points, day(2), &jst).unwrap();
        assert_eq!(summary.points, 2);
        assert_eq!(summarize(&points, day(2), &Utc), Err(InsufficientData::SingleSample));
    }

    #[test]
    fn test_zero_start_has_no_percent() {
        let points = vec![at(2, 1, 0.0), at(2, 2, 1.0)];
        let summary = summarize(&points, day(2), &Utc).unwrap();
        assert_eq!(summary.change_percent, None);
        assert_eq!(summary.max, 1.0);
    }

    #[test]
    fn test_order_is_taken_as_given() {
        // Start and end follow input order, not timestamps
        let points = vec![at(2, 20, 97.0), at(2, 8, 100.0)];
        let summary = summarize_range(&points).unwrap();
        assert_eq!(summary.start, 97.0);
        assert_eq!(summary.end, 100.0);
    }
}
