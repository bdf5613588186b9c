//! In-memory representation of one tri-axial recording.

use crate::error::{ConditioningError, Result};
use serde::{Deserialize, Serialize};

/// The three acceleration axes of a recording, always of equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Axes {
    /// Build axes, rejecting mismatched lengths.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(ConditioningError::InvalidInput(format!(
                "axis lengths differ: x={}, y={}, z={}",
                x.len(),
                y.len(),
                z.len()
            )));
        }
        Ok(Self { x, y, z })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Sample `i` as an `[x, y, z]` triple.
    pub fn sample(&self, i: usize) -> [f64; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Mutable access to each axis in x, y, z order.
    pub fn each_mut(&mut self) -> [&mut Vec<f64>; 3] {
        [&mut self.x, &mut self.y, &mut self.z]
    }
}

/// One recording: timestamps plus three axes.
///
/// Owns no behavior beyond storage and slicing. The conditioning pipeline
/// consumes it by value, so a stream can only be processed once.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStream {
    name: String,
    timestamp: Vec<i64>,
    axes: Axes,
}

impl SampleStream {
    /// Create a stream. All four sequences must have the same length.
    pub fn new(name: impl Into<String>, timestamp: Vec<i64>, axes: Axes) -> Result<Self> {
        if timestamp.len() != axes.len() {
            return Err(ConditioningError::InvalidInput(format!(
                "{} timestamps but {} samples",
                timestamp.len(),
                axes.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            timestamp,
            axes,
        })
    }

    /// Convenience constructor from raw vectors.
    pub fn from_vecs(
        name: impl Into<String>,
        timestamp: Vec<i64>,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    ) -> Result<Self> {
        Self::new(name, timestamp, Axes::new(x, y, z)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> &[i64] {
        &self.timestamp
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    /// Samples in the half-open index range, clipped to the stream bounds.
    pub fn slice(&self, start: usize, end: usize) -> Vec<[f64; 3]> {
        let end = end.min(self.len());
        let start = start.min(end);
        (start..end).map(|i| self.axes.sample(i)).collect()
    }

    pub(crate) fn into_parts(self) -> (String, Vec<i64>, Axes) {
        (self.name, self.timestamp, self.axes)
    }
}

/// Something holding timestamps and tri-axial samples that can be windowed.
///
/// Implemented by raw and conditioned streams so label export works on
/// either.
pub trait Recording {
    fn timestamps(&self) -> &[i64];
    fn samples(&self) -> &Axes;
}

impl Recording for SampleStream {
    fn timestamps(&self) -> &[i64] {
        &self.timestamp
    }

    fn samples(&self) -> &Axes {
        &self.axes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_axes_rejected() {
        let err = Axes::new(vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ConditioningError::InvalidInput(_)));
    }

    #[test]
    fn test_mismatched_timestamps_rejected() {
        let err = SampleStream::from_vecs("s", vec![1, 2, 3], vec![0.0], vec![0.0], vec![0.0])
            .unwrap_err();
        assert!(matches!(err, ConditioningError::InvalidInput(_)));
    }

    #[test]
    fn test_slice_is_clipped() {
        let stream = SampleStream::from_vecs(
            "s",
            vec![1, 2, 3],
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        )
        .unwrap();

        assert_eq!(stream.slice(1, 10), vec![[2.0, 5.0, 8.0], [3.0, 6.0, 9.0]]);
        assert!(stream.slice(5, 10).is_empty());
    }
}
