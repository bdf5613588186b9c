//! Peak-based event segmentation.
//!
//! The conditioned, merged signal is handed to a [`PeakAnalysis`]
//! implementation; consecutive peaks delimit candidate gesture segments.

use crate::core::normalize::merge;
use crate::core::pipeline::ConditionedStream;
use crate::error::{ConditioningError, Result};
use crate::recording::SampleStream;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Peak detector consumed by the [`Segmenter`].
pub trait PeakAnalysis {
    /// Indices of detected peaks in ascending order.
    fn segment(&self, signal: &[f64], visualize: bool) -> Vec<usize>;
}

/// Detects strict local maxima that rise above `mean + k * stddev`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocalMaximaAnalyzer {
    /// Threshold in standard deviations above the mean
    pub threshold_std: f64,
    /// Half-width of the neighbourhood a peak must dominate
    pub neighbourhood: usize,
    /// Minimum distance between two kept peaks, in samples
    pub min_distance: usize,
}

impl Default for LocalMaximaAnalyzer {
    fn default() -> Self {
        Self {
            threshold_std: 1.0,
            neighbourhood: 5,
            min_distance: 10,
        }
    }
}

impl LocalMaximaAnalyzer {
    fn is_local_max(&self, signal: &[f64], i: usize) -> bool {
        let lo = i.saturating_sub(self.neighbourhood);
        let hi = (i + self.neighbourhood).min(signal.len() - 1);
        let center = signal[i];

        // Plateaus count once, at their first sample.
        (lo..i).all(|j| signal[j] < center) && (i + 1..=hi).all(|j| signal[j] <= center)
    }
}

impl PeakAnalysis for LocalMaximaAnalyzer {
    fn segment(&self, signal: &[f64], visualize: bool) -> Vec<usize> {
        if signal.len() < 3 {
            return Vec::new();
        }

        let mean = signal.iter().mean();
        let std_dev = signal.iter().population_std_dev();
        let threshold = mean + self.threshold_std * std_dev;

        let mut candidates: Vec<usize> = (0..signal.len())
            .filter(|&i| signal[i] > threshold && self.is_local_max(signal, i))
            .collect();

        // Keep the tallest peaks first, dropping any within min_distance of one kept.
        candidates.sort_by(|&a, &b| signal[b].total_cmp(&signal[a]).then(a.cmp(&b)));
        let mut kept: Vec<usize> = Vec::new();
        for candidate in candidates {
            if kept.iter().all(|&k| k.abs_diff(candidate) >= self.min_distance) {
                kept.push(candidate);
            }
        }
        kept.sort_unstable();

        if visualize {
            tracing::info!(peaks = ?kept, threshold, "peak analysis");
        }
        kept
    }
}

/// A candidate event between two consecutive peaks (inclusive indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
}

impl Segment {
    /// Number of samples covered, both peaks included.
    pub fn sample_count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_timestamp - self.start_timestamp
    }
}

/// Peaks and the segments they delimit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    pub peaks: Vec<usize>,
    pub segments: Vec<Segment>,
}

/// Hands conditioned signals to a peak analyzer.
#[derive(Debug, Clone)]
pub struct Segmenter<A = LocalMaximaAnalyzer> {
    analyzer: A,
}

impl Default for Segmenter<LocalMaximaAnalyzer> {
    fn default() -> Self {
        Self::new(LocalMaximaAnalyzer::default())
    }
}

impl<A: PeakAnalysis> Segmenter<A> {
    pub fn new(analyzer: A) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Segment a conditioned stream.
    ///
    /// Merged streams use their conditioned signal; per-axis streams are
    /// merged from their conditioned axes first.
    pub fn segment(&self, stream: &ConditionedStream, visualize: bool) -> Result<Segmentation> {
        match stream.merged_signal() {
            Some(signal) => self.segment_signal(signal, stream.timestamp(), visualize),
            None => {
                let signal = merge(stream.axes())?;
                self.segment_signal(&signal, stream.timestamp(), visualize)
            }
        }
    }

    /// Segment an unconditioned recording on the mean of its raw axes.
    pub fn segment_raw(&self, stream: &SampleStream, visualize: bool) -> Result<Segmentation> {
        let signal = merge(stream.axes())?;
        self.segment_signal(&signal, stream.timestamp(), visualize)
    }

    /// Segment any signal with matching timestamps.
    pub fn segment_signal(
        &self,
        signal: &[f64],
        timestamp: &[i64],
        visualize: bool,
    ) -> Result<Segmentation> {
        if signal.len() != timestamp.len() {
            return Err(ConditioningError::InvalidInput(format!(
                "{} signal samples but {} timestamps",
                signal.len(),
                timestamp.len()
            )));
        }

        let peaks = self.analyzer.segment(signal, visualize);
        let segments = peaks
            .windows(2)
            .map(|pair| Segment {
                start: pair[0],
                end: pair[1],
                start_timestamp: timestamp[pair[0]],
                end_timestamp: timestamp[pair[1]],
            })
            .collect();

        tracing::debug!(peaks = peaks.len(), "segmented signal");
        Ok(Segmentation { peaks, segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat signal with narrow bumps at the given indices.
    fn bumps(n: usize, at: &[usize]) -> Vec<f64> {
        let mut signal = vec![0.0; n];
        for &i in at {
            signal[i] = 5.0;
            signal[i - 1] = 2.0;
            signal[i + 1] = 2.0;
        }
        signal
    }

    #[test]
    fn test_detects_isolated_peaks() {
        let signal = bumps(100, &[20, 50, 80]);
        let peaks = LocalMaximaAnalyzer::default().segment(&signal, false);
        assert_eq!(peaks, vec![20, 50, 80]);
    }

    #[test]
    fn test_min_distance_keeps_tallest() {
        let mut signal = bumps(100, &[40, 45]);
        signal[45] = 6.0;
        let peaks = LocalMaximaAnalyzer {
            neighbourhood: 1,
            ..LocalMaximaAnalyzer::default()
        }
        .segment(&signal, false);
        assert_eq!(peaks, vec![45]);
    }

    #[test]
    fn test_flat_signal_has_no_peaks() {
        assert!(LocalMaximaAnalyzer::default()
            .segment(&[1.0; 50], false)
            .is_empty());
        assert!(LocalMaximaAnalyzer::default().segment(&[1.0], true).is_empty());
    }

    #[test]
    fn test_segments_between_consecutive_peaks() {
        let signal = bumps(100, &[20, 50, 80]);
        let timestamp: Vec<i64> = (0..100).map(|i| i * 10).collect();

        let result = Segmenter::default()
            .segment_signal(&signal, &timestamp, false)
            .unwrap();

        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0].start, 20);
        assert_eq!(result.segments[0].end, 50);
        assert_eq!(result.segments[1].duration_ms(), 300);
        assert_eq!(result.segments[1].sample_count(), 31);
    }

    #[test]
    fn test_default_segmenter_uses_local_maxima() {
        let segmenter = Segmenter::default();
        assert_eq!(segmenter.analyzer().min_distance, 10);
        assert_eq!(segmenter.analyzer().neighbourhood, 5);
    }

    #[test]
    fn test_mismatched_timestamps_rejected() {
        let result = Segmenter::default().segment_signal(&[0.0; 10], &[0; 9], false);
        assert!(matches!(result, Err(ConditioningError::InvalidInput(_))));
    }

    struct FixedPeaks(Vec<usize>);

    impl PeakAnalysis for FixedPeaks {
        fn segment(&self, _signal: &[f64], _visualize: bool) -> Vec<usize> {
            self.0.clone()
        }
    }

    #[test]
    fn test_custom_analyzer_on_raw_stream() {
        let stream = SampleStream::from_vecs(
            "s",
            vec![0, 10, 20, 30],
            vec![3.0, 0.0, 0.0, 3.0],
            vec![0.0; 4],
            vec![0.0; 4],
        )
        .unwrap();

        let result = Segmenter::new(FixedPeaks(vec![0, 3]))
            .segment_raw(&stream, false)
            .unwrap();
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].end_timestamp, 30);
    }
}
