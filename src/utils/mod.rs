pub mod box_utils;
pub mod config;
pub mod error;
pub mod histogram;

pub use config::{AssemblyConfig, ConfidenceThresholds, LeftFillStrategy};
pub use error::ConfigError;
pub use histogram::IntervalHistogram;
