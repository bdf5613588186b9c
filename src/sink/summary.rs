//! Sink that keeps per-stage statistics instead of plotting.
//!
//! Used by the CLI to report what each conditioning stage did to the signal.

use crate::sink::VisualizationSink;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Statistics of one channel at one stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl ChannelStats {
    fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            min,
            max,
            mean: values.iter().mean(),
            std_dev: values.iter().population_std_dev(),
        }
    }
}

/// Summary of one notified stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub title: String,
    pub samples: usize,
    /// One entry per channel: three in per-axis mode, one when merged.
    pub channels: Vec<ChannelStats>,
}

/// Collects a [`StageSummary`] per notification.
#[derive(Debug, Default)]
pub struct SummarySink {
    stages: Vec<StageSummary>,
    finished: bool,
}

impl SummarySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[StageSummary] {
        &self.stages
    }

    /// Whether the pipeline reported completion.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let mut out = String::from("Stage Statistics:\n");
        for stage in &self.stages {
            out.push_str(&format!("- {} ({} samples)\n", stage.title, stage.samples));
            let names: &[&str] = if stage.channels.len() == 3 {
                &["x", "y", "z"]
            } else {
                &["signal"]
            };
            for (name, stats) in names.iter().zip(&stage.channels) {
                out.push_str(&format!(
                    "    {name:>6}: min {:>10.4}  max {:>10.4}  mean {:>10.4}  std {:>10.4}\n",
                    stats.min, stats.max, stats.mean, stats.std_dev
                ));
            }
        }
        out
    }
}

impl VisualizationSink for SummarySink {
    fn plot_sensor_data(&mut self, title: &str, timestamp: &[i64], x: &[f64], y: &[f64], z: &[f64]) {
        self.stages.push(StageSummary {
            title: title.to_string(),
            samples: timestamp.len(),
            channels: vec![ChannelStats::of(x), ChannelStats::of(y), ChannelStats::of(z)],
        });
    }

    fn plot_signal(&mut self, title: &str, timestamp: &[i64], signal: &[f64]) {
        self.stages.push(StageSummary {
            title: title.to_string(),
            samples: timestamp.len(),
            channels: vec![ChannelStats::of(signal)],
        });
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_counting() {
        let mut sink = SummarySink::new();
        sink.plot_sensor_data("a raw", &[1, 2, 3], &[1.0, 2.0, 3.0], &[0.0; 3], &[0.0; 3]);
        sink.plot_signal("a kalman filter", &[1, 2, 3], &[-1.0, 0.0, 1.0]);

        assert_eq!(sink.stages().len(), 2);
        assert_eq!(sink.stages()[0].channels.len(), 3);
        assert_eq!(sink.stages()[1].channels.len(), 1);

        let x = sink.stages()[0].channels[0];
        assert_eq!(x.min, 1.0);
        assert_eq!(x.max, 3.0);
        assert!((x.mean - 2.0).abs() < 1e-12);
        assert!(!sink.is_finished());
    }

    #[test]
    fn test_summary_format() {
        let mut sink = SummarySink::new();
        sink.plot_signal("walk normalize", &[1, 2], &[-1.0, 1.0]);
        sink.finish();

        let summary = sink.summary();
        assert!(summary.contains("Stage Statistics"));
        assert!(summary.contains("walk normalize (2 samples)"));
        assert!(summary.contains("signal"));
        assert!(sink.is_finished());
    }
}
