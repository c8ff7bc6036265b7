//! Recover sample history from legacy log files
//!
//! Old check logs carry lines such as
//! `2025-03-01 09:00:00,123 - INFO - Previous: 146.0000, Current: 146.3400, Change: 0.23%`
//! or `... - 10-Year Treasury: 4.45% (2025-03-01)`. Anything that does not parse
//! is skipped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

use crate::data::HistoryPoint;

/// Extracts `(timestamp, value)` pairs from lines carrying a marker token
pub struct LogScanner<Tz: TimeZone> {
    marker: String,
    value_re: Regex,
    stamp_re: Regex,
    tz: Tz,
}

/// Result of scanning a whole log
#[derive(Debug, Default)]
pub struct ScanStats {
    pub lines: usize,
    pub matched: usize,
    pub malformed: usize,
}

impl<Tz: TimeZone> LogScanner<Tz> {
    /// `tz` interprets timestamps that carry no zone (the legacy logs used
    /// local wall-clock time).
    pub fn new(marker: &str, tz: Tz) -> Result<Self, regex::Error> {
        let value_re = Regex::new(&format!(
            r"{}\s*\$?(-?\d+(?:\.\d+)?)",
            regex::escape(marker)
        ))?;
        let stamp_re = Regex::new(
            r"(\d{4}-\d{2}-\d{2})(?:[ T](\d{2}:\d{2}:\d{2})(?:[.,]\d+)?(Z)?)?",
        )?;

        Ok(Self {
            marker: marker.to_string(),
            value_re,
            stamp_re,
            tz,
        })
    }

    /// Parse one line. `None` for lines without the marker or with an
    /// unreadable stamp or value.
    pub fn parse_line(&self, line: &str) -> Option<HistoryPoint> {
        if !line.contains(&self.marker) {
            return None;
        }

        let value: f64 = self.value_re.captures(line)?.get(1)?.as_str().parse().ok()?;
        let timestamp = self.parse_stamp(line)?;

        Some(HistoryPoint::new(timestamp, value))
    }

    fn parse_stamp(&self, line: &str) -> Option<DateTime<Utc>> {
        let caps = self.stamp_re.captures(line)?;
        let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d").ok()?;
        let time = match caps.get(2) {
            Some(t) => NaiveTime::parse_from_str(t.as_str(), "%H:%M:%S").ok()?,
            None => NaiveTime::MIN,
        };
        let naive = NaiveDateTime::new(date, time);

        if caps.get(3).is_some() {
            return Some(Utc.from_utc_datetime(&naive));
        }
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Scan every line of `text`, keeping the points in file order
    pub fn scan(&self, text: &str) -> (Vec<HistoryPoint>, ScanStats) {
        let mut stats = ScanStats::default();
        let mut points = Vec::new();

        for line in text.lines() {
            stats.lines += 1;
            if !line.contains(&self.marker) {
                continue;
            }
            match self.parse_line(line) {
                Some(point) => {
                    stats.matched += 1;
                    points.push(point);
                }
                None => stats.malformed += 1,
            }
        }

        (points, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_parse_fx_line() {
        let scanner = LogScanner::new("Current:", Utc).unwrap();
        let point = scanner
            .parse_line(
                "2025-03-01 09:15:00,123 - INFO - Previous: 146.0000, Current: 146.3400, Change: 0.23%",
            )
            .unwrap();

        assert_eq!(point.value, 146.34);
        assert_eq!(point.timestamp, Utc.with_ymd_and_hms(2025, 3, 1, 9, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_treasury_line_with_day_stamp_only() {
        let scanner = LogScanner::new("10-Year Treasury:", Utc).unwrap();
        let point = scanner.parse_line("10-Year Treasury: 4.45% (2025-03-01)").unwrap();

        assert_eq!(point.value, 4.45);
        assert_eq!(point.timestamp, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_local_offset_applies_to_naive_stamps() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let scanner = LogScanner::new("Current:", jst).unwrap();
        let point = scanner
            .parse_line("2025-03-01 09:00:00 - INFO - Current: 150.0")
            .unwrap();
        assert_eq!(point.timestamp, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());

        // Explicit UTC stamps from tracing output are left alone
        let point = scanner
            .parse_line("2025-03-01T09:00:00.123456Z  INFO pricewatch: Current: 150.0")
            .unwrap();
        assert_eq!(point.timestamp, Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_scan_skips_malformed() {
        let scanner = LogScanner::new("Current:", Utc).unwrap();
        let text = "\
2025-03-01 08:00:00 - INFO - Previous: 99.0, Current: 100.0, Change: 1.01%
2025-03-01 09:00:00 - INFO - Current: n/a
garbage line
Current: 101.0 with no stamp
2025-03-01 10:00:00 - INFO - Previous: 100.0, Current: 102.5, Change: 2.50%
";
        let (points, stats) = scanner.scan(text);

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![100.0, 102.5]);
        assert_eq!(stats.lines, 5);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.malformed, 2);
    }
}
