//! Threshold alerting
//!
//! Rule definitions, the pure decision policy and notification delivery.

pub mod config;
pub mod notifier;
pub mod policy;

pub use config::{AlertEvent, Direction, NotifyTarget, ThresholdRule};
pub use notifier::{Notifier, NotifierError, Notify};
pub use policy::{decide, PolicyError};
