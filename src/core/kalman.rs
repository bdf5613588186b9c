//! Scalar Kalman smoothing.
//!
//! Each step depends only on the previous posterior, so the recursion is a
//! strictly sequential scan. Independent channels may run concurrently, a
//! single channel never does.

use crate::error::{ConditioningError, Result};

/// Posterior estimate at the first sample. The signal is assumed to start at rest.
pub const INITIAL_ESTIMATE: f64 = 0.0;

/// Posterior error at the first sample.
pub const INITIAL_ERROR: f64 = 1.0;

/// Estimate and posterior error for every sample.
#[derive(Debug, Clone, PartialEq)]
pub struct KalmanTrajectory {
    pub estimate: Vec<f64>,
    pub error: Vec<f64>,
}

/// Scalar Kalman estimator with constant process and measurement variance.
#[derive(Debug, Clone, Copy)]
pub struct KalmanEstimator {
    process_variance: f64,
    measurement_variance: f64,
}

impl KalmanEstimator {
    /// Create an estimator.
    ///
    /// `measurement_variance` must be strictly positive and
    /// `process_variance` non-negative, both finite.
    pub fn new(process_variance: f64, measurement_variance: f64) -> Result<Self> {
        if !measurement_variance.is_finite() || measurement_variance <= 0.0 {
            return Err(ConditioningError::InvalidParameters(format!(
                "measurement variance must be positive, got {measurement_variance}"
            )));
        }
        if !process_variance.is_finite() || process_variance < 0.0 {
            return Err(ConditioningError::InvalidParameters(format!(
                "process variance must be non-negative, got {process_variance}"
            )));
        }
        Ok(Self {
            process_variance,
            measurement_variance,
        })
    }

    pub fn process_variance(&self) -> f64 {
        self.process_variance
    }

    pub fn measurement_variance(&self) -> f64 {
        self.measurement_variance
    }

    /// Denoised trajectory, same length as `data`.
    pub fn estimate(&self, data: &[f64]) -> Vec<f64> {
        self.run(data).estimate
    }

    /// Run the recursion, keeping the posterior error as well.
    pub fn run(&self, data: &[f64]) -> KalmanTrajectory {
        let mut estimate = Vec::with_capacity(data.len());
        let mut error = Vec::with_capacity(data.len());

        if data.is_empty() {
            return KalmanTrajectory { estimate, error };
        }

        estimate.push(INITIAL_ESTIMATE);
        error.push(INITIAL_ERROR);

        let (mut posterior, mut posterior_error) = (INITIAL_ESTIMATE, INITIAL_ERROR);
        for &measurement in &data[1..] {
            let prior = posterior;
            let prior_error = posterior_error + self.process_variance;

            let gain = prior_error / (prior_error + self.measurement_variance);

            posterior = prior + gain * (measurement - prior);
            posterior_error = (1.0 - gain) * prior_error;

            estimate.push(posterior);
            error.push(posterior_error);
        }

        KalmanTrajectory { estimate, error }
    }
}
