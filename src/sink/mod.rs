//! Visualization sinks notified by the conditioning pipeline.
//!
//! A sink is a pure side channel: the pipeline hands it a titled snapshot
//! after every stage and never reads anything back.

pub mod channel;
pub mod summary;

pub use channel::{ChannelSink, SinkMessage, StageSignals, StageSnapshot};
pub use summary::{ChannelStats, StageSummary, SummarySink};

/// Receiver of per-stage signal snapshots.
pub trait VisualizationSink {
    /// Per-axis display of a stage.
    fn plot_sensor_data(&mut self, title: &str, timestamp: &[i64], x: &[f64], y: &[f64], z: &[f64]);

    /// Merged single-signal display of a stage.
    fn plot_signal(&mut self, title: &str, timestamp: &[i64], signal: &[f64]);

    /// Called once after the last stage.
    fn finish(&mut self) {}
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl VisualizationSink for NullSink {
    fn plot_sensor_data(&mut self, _: &str, _: &[i64], _: &[f64], _: &[f64], _: &[f64]) {}

    fn plot_signal(&mut self, _: &str, _: &[i64], _: &[f64]) {}
}
