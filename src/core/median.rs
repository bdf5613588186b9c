//! Sliding-window median filter.
//!
//! Near the edges the window shrinks symmetrically instead of padding, so
//! the output always has the same length as the input and boundary samples
//! are never discarded.

use crate::error::{ConditioningError, Result};

/// Window size used when none is configured explicitly.
pub const DEFAULT_MEDIAN_WINDOW: usize = 3;

/// Median filter with a fixed odd window.
#[derive(Debug, Clone, Copy)]
pub struct MedianSmoother {
    window: usize,
}

impl MedianSmoother {
    /// Create a smoother. The window must be odd and positive.
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 || window % 2 == 0 {
            return Err(ConditioningError::InvalidFilterParameters(format!(
                "median window must be odd and positive, got {window}"
            )));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Filter a sequence, returning a new one of the same length.
    pub fn apply(&self, data: &[f64]) -> Vec<f64> {
        let n = data.len();
        let half = self.window / 2;
        let mut scratch = Vec::with_capacity(self.window);

        (0..n)
            .map(|i| {
                let reach = half.min(i).min(n - 1 - i);
                scratch.clear();
                scratch.extend_from_slice(&data[i - reach..=i + reach]);
                median_of_odd(&mut scratch)
            })
            .collect()
    }
}

impl Default for MedianSmoother {
    fn default() -> Self {
        Self {
            window: DEFAULT_MEDIAN_WINDOW,
        }
    }
}

/// Median of an odd-length, non-empty buffer. Reorders the buffer.
fn median_of_odd(values: &mut [f64]) -> f64 {
    let mid = values.len() / 2;
    let (_, median, _) = values.select_nth_unstable_by(mid, f64::total_cmp);
    *median
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_and_zero_windows_rejected() {
        assert!(matches!(
            MedianSmoother::new(4),
            Err(ConditioningError::InvalidFilterParameters(_))
        ));
        assert!(MedianSmoother::new(0).is_err());
    }

    #[test]
    fn test_window_one_is_identity() {
        let data = vec![3.0, -1.0, 7.5, 0.0, 2.0];
        let smoother = MedianSmoother::new(1).unwrap();
        assert_eq!(smoother.apply(&data), data);
    }

    #[test]
    fn test_length_preserved_for_odd_windows() {
        let data: Vec<f64> = (0..17).map(|i| ((i * 7) % 5) as f64).collect();
        for window in [1, 3, 5, 7, 9, 21] {
            let smoother = MedianSmoother::new(window).unwrap();
            assert_eq!(smoother.apply(&data).len(), data.len(), "window {window}");
        }
    }

    #[test]
    fn test_spike_removed() {
        let data = vec![1.0, 1.0, 50.0, 1.0, 1.0];
        let out = MedianSmoother::default().apply(&data);
        assert_eq!(out, vec![1.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_edges_use_shrinking_window() {
        // First and last samples have no symmetric neighbours at all.
        let data = vec![9.0, 1.0, 2.0, 3.0, -9.0];
        let out = MedianSmoother::new(5).unwrap().apply(&data);

        assert_eq!(out[0], 9.0);
        assert_eq!(out[1], 2.0); // median of 9, 1, 2
        assert_eq!(out[2], 2.0); // median of all five
        assert_eq!(out[3], 2.0); // median of 2, 3, -9
        assert_eq!(out[4], -9.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(MedianSmoother::default().apply(&[]).is_empty());
    }
}
