//! Synheart Motion - conditioning pipeline for tri-axial motion recordings.
//!
//! This library turns a captured accelerometer recording into a denoised
//! signal suitable for gesture segmentation and labeled training sample
//! export.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Synheart Motion                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌──────────┐   ┌─────────────┐  │
//! │  │ Recording │──▶│ Normalize │──▶│ Median / │──▶│   Kalman    │  │
//! │  │   (CSV)   │   │ (+merge)  │   │   Band   │   │  smoothing  │  │
//! │  └───────────┘   └───────────┘   └──────────┘   └─────────────┘  │
//! │                        │               │               │         │
//! │                        ▼               ▼               ▼         │
//! │                  ┌──────────────────────────┐   ┌─────────────┐  │
//! │                  │    Visualization sink    │   │ Segmenter / │  │
//! │                  │   (per-stage snapshots)  │   │ LabelExport │  │
//! │                  └──────────────────────────┘   └─────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use synheart_motion::core::{FilterConfig, FilterType, Pipeline, Segmenter};
//! use synheart_motion::recording::load_csv_file;
//! use std::path::Path;
//!
//! let stream = load_csv_file(Path::new("recordings/acc_walk.csv")).expect("load");
//! let config = FilterConfig {
//!     sampling_rate: Some(50.0),
//!     filter_type: Some(FilterType::LowPass),
//!     median_window: Some(5),
//!     ..FilterConfig::default()
//! };
//!
//! let conditioned = Pipeline::new(config).with_merge(true).process(stream).expect("process");
//! let segmentation = Segmenter::default().segment(&conditioned, false).expect("segment");
//! println!("{} segments", segmentation.segments.len());
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod recording;
pub mod sink;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    ConditionedStream, FilterConfig, FilterType, LabelExporter, Pipeline, Segmenter, SignalState,
};
pub use error::{ConditioningError, Result};
pub use recording::{load_csv_file, Recording, SampleStream};
pub use sink::{NullSink, VisualizationSink};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
