//! Alert configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Threshold a tracked metric is checked against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdRule {
    /// Trigger when |current - previous| / previous >= threshold
    Relative {
        threshold: f64,
        /// Sub-metric checked for multi-series samples
        #[serde(default)]
        series: Option<String>,
    },
    /// Trigger when current >= bound, regardless of the baseline
    Absolute {
        bound: f64,
        #[serde(default)]
        series: Option<String>,
    },
}

impl ThresholdRule {
    pub fn relative(threshold: f64) -> Self {
        ThresholdRule::Relative {
            threshold,
            series: None,
        }
    }

    pub fn absolute(bound: f64) -> Self {
        ThresholdRule::Absolute {
            bound,
            series: None,
        }
    }

    /// Designate the sub-metric this rule evaluates
    pub fn with_series(self, name: impl Into<String>) -> Self {
        let name = Some(name.into());
        match self {
            ThresholdRule::Relative { threshold, .. } => ThresholdRule::Relative {
                threshold,
                series: name,
            },
            ThresholdRule::Absolute { bound, .. } => ThresholdRule::Absolute {
                bound,
                series: name,
            },
        }
    }

    /// Get the sub-metric this rule checks (if any)
    pub fn series(&self) -> Option<&str> {
        match self {
            ThresholdRule::Relative { series, .. } | ThresholdRule::Absolute { series, .. } => {
                series.as_deref()
            }
        }
    }

    /// The configured threshold or bound
    pub fn limit(&self) -> f64 {
        match self {
            ThresholdRule::Relative { threshold, .. } => *threshold,
            ThresholdRule::Absolute { bound, .. } => *bound,
        }
    }

    /// Human-readable description used in reports
    pub fn describe(&self) -> String {
        match self {
            ThresholdRule::Relative { threshold, .. } => {
                format!("change >= {:.1}%", threshold * 100.0)
            }
            ThresholdRule::Absolute { bound, series } => match series {
                Some(name) => format!("{} >= {:.1}", name, bound),
                None => format!("value >= {:.1}", bound),
            },
        }
    }
}

/// Direction of a fired alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    OverThreshold,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::OverThreshold => write!(f, "over threshold"),
        }
    }
}

/// A fired alert. Produced, sent and dropped; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub metric_id: String,
    pub direction: Direction,
    pub current_value: f64,
    /// Absent for absolute alerts
    pub previous_value: Option<f64>,
    /// |change| as a fraction for relative alerts, excess over the bound for
    /// absolute alerts
    pub change_magnitude: f64,
    pub message_text: String,
}

impl AlertEvent {
    /// Notification title for this event
    pub fn title(&self, metric_name: &str) -> String {
        match self.direction {
            Direction::OverThreshold => format!("{} threshold warning", metric_name),
            Direction::Up | Direction::Down => format!("{} alert", metric_name),
        }
    }
}

/// Notification target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotifyTarget {
    /// Log to tracing
    Log,
    /// HTTP webhook
    Webhook {
        url: String,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
    /// Pushover push message
    Pushover {
        #[serde(default)]
        api_token: String,
        #[serde(default)]
        user_key: String,
    },
}
