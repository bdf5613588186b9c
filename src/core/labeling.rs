//! Labeled window extraction and export.
//!
//! Each label timestamp is matched to the nearest sample; a fixed-size
//! window around that sample is written as a text block:
//!
//! ```text
//! label tap
//! x,y,z
//! 0.12,-0.4,9.8
//! ...
//!
//! ```
//!
//! Windows reaching past either end of the recording are zero-padded, so
//! every block holds exactly `window_size` samples.

use crate::error::{ConditioningError, Result};
use crate::recording::Recording;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Samples per exported window.
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Fill value for window positions outside the recording.
const PADDING: [f64; 3] = [0.0, 0.0, 0.0];

/// A fixed-length window of samples around one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledWindow {
    pub label: String,
    /// Index of the sample nearest the label timestamp
    pub center: usize,
    pub samples: Vec<[f64; 3]>,
}

/// Index of the timestamp closest to `target`; ties resolve to the earliest.
pub fn nearest_index(timestamps: &[i64], target: i64) -> Option<usize> {
    timestamps
        .iter()
        .enumerate()
        .min_by_key(|(_, &t)| t.abs_diff(target))
        .map(|(i, _)| i)
}

/// Write windows in the block format shown in the module docs.
pub fn write_windows<W: Write>(mut writer: W, windows: &[LabeledWindow]) -> std::io::Result<()> {
    for window in windows {
        writeln!(writer, "label {}", window.label)?;
        writeln!(writer, "x,y,z")?;
        for [x, y, z] in &window.samples {
            writeln!(writer, "{x},{y},{z}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

/// Extracts labeled windows and writes them per session.
#[derive(Debug, Clone)]
pub struct LabelExporter {
    output_dir: PathBuf,
    window_size: usize,
}

impl LabelExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// Use a different window size. Zero is rejected.
    pub fn with_window_size(mut self, window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(ConditioningError::InvalidParameters(
                "label window size must be positive".to_string(),
            ));
        }
        self.window_size = window_size;
        Ok(self)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Export file for a session.
    pub fn output_path(&self, session_id: &str) -> PathBuf {
        self.output_dir.join(format!("{session_id}_samples.csv"))
    }

    /// Extract one window per label.
    pub fn windows<R, L>(
        &self,
        recording: &R,
        label_timestamps: &[i64],
        labels: &[L],
    ) -> Result<Vec<LabeledWindow>>
    where
        R: Recording + ?Sized,
        L: Display,
    {
        if label_timestamps.len() != labels.len() {
            return Err(ConditioningError::InvalidInput(format!(
                "{} label timestamps but {} labels",
                label_timestamps.len(),
                labels.len()
            )));
        }

        let timestamps = recording.timestamps();
        let axes = recording.samples();
        if timestamps.is_empty() {
            return Err(ConditioningError::InvalidInput(
                "cannot extract windows from an empty recording".to_string(),
            ));
        }

        let half = (self.window_size / 2) as i64;
        let len = timestamps.len() as i64;

        let windows = label_timestamps
            .iter()
            .zip(labels)
            .filter_map(|(&target, label)| {
                let center = nearest_index(timestamps, target)?;
                let start = center as i64 - half;
                let samples = (start..start + self.window_size as i64)
                    .map(|i| {
                        if (0..len).contains(&i) {
                            axes.sample(i as usize)
                        } else {
                            PADDING
                        }
                    })
                    .collect();
                Some(LabeledWindow {
                    label: label.to_string(),
                    center,
                    samples,
                })
            })
            .collect();

        Ok(windows)
    }

    /// Extract windows and write them to `<output_dir>/<session_id>_samples.csv`.
    pub fn export<R, L>(
        &self,
        recording: &R,
        session_id: &str,
        label_timestamps: &[i64],
        labels: &[L],
    ) -> Result<PathBuf>
    where
        R: Recording + ?Sized,
        L: Display,
    {
        let windows = self.windows(recording, label_timestamps, labels)?;

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| ConditioningError::io(&self.output_dir, e))?;

        let path = self.output_path(session_id);
        let file = File::create(&path).map_err(|e| ConditioningError::io(&path, e))?;
        write_windows(BufWriter::new(file), &windows)
            .map_err(|e| ConditioningError::io(&path, e))?;

        tracing::info!(
            path = %path.display(),
            labels = windows.len(),
            window = self.window_size,
            "exported labeled windows"
        );
        Ok(path)
    }
}
