//! Core signal conditioning.
//!
//! This module contains:
//! - Per-stage transforms (normalization, median, Butterworth, Kalman)
//! - The pipeline that sequences them over one recording
//! - Peak-based segmentation and labeled window export

pub mod butterworth;
pub mod kalman;
pub mod labeling;
pub mod median;
pub mod normalize;
pub mod pipeline;
pub mod segmentation;

// Re-export commonly used types
pub use butterworth::{ButterworthFilter, FilterType, BUTTERWORTH_ORDER, CUTOFF_FREQUENCY_HZ};
pub use kalman::{KalmanEstimator, KalmanTrajectory};
pub use labeling::{LabelExporter, LabeledWindow, DEFAULT_WINDOW_SIZE};
pub use median::MedianSmoother;
pub use normalize::{merge, normalize};
pub use pipeline::{ConditionedStream, FilterConfig, Pipeline, SignalState, Stage};
pub use segmentation::{LocalMaximaAnalyzer, PeakAnalysis, Segment, Segmentation, Segmenter};
