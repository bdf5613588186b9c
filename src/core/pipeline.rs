//! The conditioning pipeline.
//!
//! Stages run strictly in order:
//!
//! ```text
//! raw → normalize → (merge?) → (median filter?) → (band filter?) → kalman filter
//! ```
//!
//! Normalization and Kalman smoothing always run; the other stages are
//! skipped when their configuration is unset. After each executed stage an
//! optional [`VisualizationSink`] receives a titled snapshot.
//!
//! [`Pipeline::process`] consumes its [`SampleStream`]. Mean removal and
//! merging are not repeatable, so a stream can only ever be conditioned once;
//! to condition the same recording again, load it again.

use crate::core::butterworth::{ButterworthFilter, FilterType};
use crate::core::kalman::KalmanEstimator;
use crate::core::median::MedianSmoother;
use crate::core::normalize::{merge, normalize};
use crate::error::{ConditioningError, Result};
use crate::recording::{Axes, Recording, SampleStream};
use crate::sink::VisualizationSink;
use serde::{Deserialize, Serialize};
use std::thread;

/// Default Kalman process variance.
pub const DEFAULT_PROCESS_VARIANCE: f64 = 1e-5;

/// Default Kalman measurement variance.
pub const DEFAULT_MEASUREMENT_VARIANCE: f64 = 0.01;

/// Channels shorter than this are filtered on the calling thread.
const PARALLEL_MIN_LEN: usize = 1024;

/// Stage parameters. An unset option disables its stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Sampling rate in Hz, required by the band filter
    pub sampling_rate: Option<f64>,
    /// Band filter type, required by the band filter
    pub filter_type: Option<FilterType>,
    /// Odd median window
    pub median_window: Option<usize>,
    /// Kalman process variance (Q)
    pub process_variance: f64,
    /// Kalman measurement variance (R)
    pub measurement_variance: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sampling_rate: None,
            filter_type: None,
            median_window: None,
            process_variance: DEFAULT_PROCESS_VARIANCE,
            measurement_variance: DEFAULT_MEASUREMENT_VARIANCE,
        }
    }
}

/// A pipeline stage, used for sink titles and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    Normalize,
    MedianFilter,
    BandFilter(FilterType),
    KalmanFilter,
}

impl Stage {
    pub fn label(&self) -> String {
        match self {
            Stage::Raw => "raw".to_string(),
            Stage::Normalize => "normalize".to_string(),
            Stage::MedianFilter => "median filter".to_string(),
            Stage::BandFilter(filter_type) => format!("{filter_type} filter"),
            Stage::KalmanFilter => "kalman filter".to_string(),
        }
    }
}

/// The signal(s) later stages operate on.
///
/// Once merged, the axes are stale: they stay available for display and
/// export but are never filtered again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SignalState {
    PerAxis(Axes),
    Merged { axes: Axes, signal: Vec<f64> },
}

impl SignalState {
    /// Replace every active signal with `f(signal)`.
    ///
    /// In per-axis mode the three channels are independent and run on
    /// scoped threads, joined before returning.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(&[f64]) -> Vec<f64> + Sync,
    {
        match self {
            SignalState::PerAxis(axes) => {
                let (x, y, z) = apply_per_axis(axes, &f);
                axes.x = x;
                axes.y = y;
                axes.z = z;
            }
            SignalState::Merged { signal, .. } => {
                *signal = f(signal);
            }
        }
    }

    /// Axes for display and export.
    pub fn axes(&self) -> &Axes {
        match self {
            SignalState::PerAxis(axes) => axes,
            SignalState::Merged { axes, .. } => axes,
        }
    }

    fn axes_mut(&mut self) -> &mut Axes {
        match self {
            SignalState::PerAxis(axes) => axes,
            SignalState::Merged { axes, .. } => axes,
        }
    }

    /// Switch to merged mode. Already merged states are returned unchanged.
    pub fn into_merged(self) -> Result<Self> {
        match self {
            SignalState::PerAxis(axes) => {
                let signal = merge(&axes)?;
                Ok(SignalState::Merged { axes, signal })
            }
            merged => Ok(merged),
        }
    }

    /// The merged signal, if the axes were merged.
    pub fn merged(&self) -> Option<&[f64]> {
        match self {
            SignalState::PerAxis(_) => None,
            SignalState::Merged { signal, .. } => Some(signal),
        }
    }

    fn notify(&self, sink: &mut dyn VisualizationSink, title: &str, timestamp: &[i64]) {
        match self {
            SignalState::PerAxis(axes) => {
                sink.plot_sensor_data(title, timestamp, &axes.x, &axes.y, &axes.z)
            }
            SignalState::Merged { signal, .. } => sink.plot_signal(title, timestamp, signal),
        }
    }
}

fn apply_per_axis<F>(axes: &Axes, f: &F) -> (Vec<f64>, Vec<f64>, Vec<f64>)
where
    F: Fn(&[f64]) -> Vec<f64> + Sync,
{
    if axes.len() < PARALLEL_MIN_LEN {
        return (f(&axes.x), f(&axes.y), f(&axes.z));
    }

    thread::scope(|scope| {
        let y = scope.spawn(|| f(&axes.y));
        let z = scope.spawn(|| f(&axes.z));
        let x = f(&axes.x);
        let join = |handle: thread::ScopedJoinHandle<'_, Vec<f64>>| {
            handle
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        };
        (x, join(y), join(z))
    })
}

/// Output of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionedStream {
    name: String,
    timestamp: Vec<i64>,
    state: SignalState,
}

impl ConditionedStream {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> &[i64] {
        &self.timestamp
    }

    pub fn state(&self) -> &SignalState {
        &self.state
    }

    /// Conditioned axes, or the normalized (stale) axes when merged.
    pub fn axes(&self) -> &Axes {
        self.state.axes()
    }

    pub fn merged_signal(&self) -> Option<&[f64]> {
        self.state.merged()
    }

    pub fn is_merged(&self) -> bool {
        self.state.merged().is_some()
    }

    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }
}

impl Recording for ConditionedStream {
    fn timestamps(&self) -> &[i64] {
        &self.timestamp
    }

    fn samples(&self) -> &Axes {
        self.axes()
    }
}

/// Validated stage set for one run.
struct Stages {
    median: Option<MedianSmoother>,
    band: Option<ButterworthFilter>,
    kalman: KalmanEstimator,
}

/// Sequences the conditioning stages over one recording.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: FilterConfig,
    merge_axes: bool,
}

impl Pipeline {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            merge_axes: false,
        }
    }

    /// Collapse the axes into one mean signal after normalization.
    pub fn with_merge(mut self, merge_axes: bool) -> Self {
        self.merge_axes = merge_axes;
        self
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn merges_axes(&self) -> bool {
        self.merge_axes
    }

    /// Condition a recording without visualization.
    pub fn process(&self, stream: SampleStream) -> Result<ConditionedStream> {
        self.run(stream, None)
    }

    /// Condition a recording, notifying `sink` after every stage.
    pub fn process_with_sink(
        &self,
        stream: SampleStream,
        sink: &mut dyn VisualizationSink,
    ) -> Result<ConditionedStream> {
        self.run(stream, Some(sink))
    }

    /// Build every enabled stage, failing before any data is touched.
    fn stages(&self) -> Result<Stages> {
        let median = self.config.median_window.map(MedianSmoother::new).transpose()?;

        let band = match (self.config.sampling_rate, self.config.filter_type) {
            (Some(rate), Some(filter_type)) => Some(ButterworthFilter::new(rate, filter_type)?),
            _ => None,
        };

        let kalman = KalmanEstimator::new(
            self.config.process_variance,
            self.config.measurement_variance,
        )?;

        Ok(Stages {
            median,
            band,
            kalman,
        })
    }

    fn run(
        &self,
        stream: SampleStream,
        mut sink: Option<&mut dyn VisualizationSink>,
    ) -> Result<ConditionedStream> {
        let stages = self.stages()?;
        if stream.is_empty() {
            return Err(ConditioningError::InvalidInput(format!(
                "recording '{}' has no samples",
                stream.name()
            )));
        }

        let (name, timestamp, axes) = stream.into_parts();
        tracing::info!(
            stream = %name,
            samples = timestamp.len(),
            merge = self.merge_axes,
            "conditioning recording"
        );

        let mut notify = |state: &SignalState, stage: Stage| {
            tracing::debug!(stream = %name, stage = %stage.label(), "stage complete");
            if let Some(sink) = sink.as_deref_mut() {
                let title = format!("{} {}", name, stage.label());
                state.notify(sink, &title, &timestamp);
            }
        };

        let mut state = SignalState::PerAxis(axes);
        notify(&state, Stage::Raw);

        normalize(state.axes_mut())?;
        notify(&state, Stage::Normalize);

        if self.merge_axes {
            state = state.into_merged()?;
        }

        if let Some(median) = stages.median {
            state.apply(|data| median.apply(data));
            notify(&state, Stage::MedianFilter);
        }

        if let Some(band) = &stages.band {
            state.apply(|data| band.apply(data));
            notify(&state, Stage::BandFilter(band.filter_type()));
        }

        let kalman = stages.kalman;
        state.apply(|data| kalman.estimate(data));
        notify(&state, Stage::KalmanFilter);

        if let Some(sink) = sink {
            sink.finish();
        }

        Ok(ConditionedStream {
            name,
            timestamp,
            state,
        })
    }
}
