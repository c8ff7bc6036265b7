//! Pricewatch: threshold-triggered metric monitor
//!
//! Samples a financial metric (crypto spot price, FX rate, treasury yield),
//! compares it with the last persisted sample and pushes a notification when
//! the change crosses a configured threshold.
//!
//! # Features
//!
//! - **Relative and absolute thresholds**: percentage moves against the
//!   baseline, or fixed bounds on a designated sub-metric
//! - **Atomic state**: the last sample per metric is replaced whole after
//!   every successful fetch
//! - **Append-only history**: every sample is kept for day summaries
//! - **Morning report**: yesterday's start/end/high/low/change in one message
//! - **Notification targets**: log, webhook, Pushover
//!
//! # Example
//!
//! ```no_run
//! use pricewatch::alerts::{decide, ThresholdRule};
//! use pricewatch::data::MetricSample;
//! use chrono::Utc;
//!
//! let previous = MetricSample::scalar("usdjpy", 100.0, Utc::now());
//! let current = MetricSample::scalar("usdjpy", 102.0, Utc::now());
//!
//! let event = decide(&current, Some(&previous), &ThresholdRule::relative(0.015)).unwrap();
//! println!("Alert: {:?}", event.map(|e| e.message_text));
//! ```

pub mod alerts;
pub mod config;
pub mod data;
pub mod monitor;
pub mod query;
pub mod source;
pub mod storage;

// Re-export commonly used types
pub use alerts::{AlertEvent, Direction, ThresholdRule};
pub use config::{AppConfig, ConfigError, MetricConfig};
pub use data::{MetricSample, SampleValue};
pub use monitor::{MonitorRun, MorningReport, RunError};
