//! Aggregations over stored sample history

pub mod moving;
pub mod summary;

pub use moving::moving_average;
pub use summary::{summarize, summarize_range, InsufficientData, WindowAccumulator, WindowSummary};
