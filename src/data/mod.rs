pub mod sample;

pub use sample::{HistoryPoint, MetricSample, SampleRecord, SampleValue};
