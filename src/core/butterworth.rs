//! Digital Butterworth low/high-pass filtering.
//!
//! The filter is designed from the analog prototype (poles on the unit
//! circle), frequency-scaled with a pre-warped cutoff, mapped to the z-plane
//! with the bilinear transform and expanded into transfer-function
//! polynomials. It is then applied causally with a transposed direct-form II
//! recursion starting from rest.

use crate::error::{ConditioningError, Result};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Order of the band filter applied by the pipeline.
pub const BUTTERWORTH_ORDER: usize = 6;

/// Fixed cutoff frequency in Hz.
pub const CUTOFF_FREQUENCY_HZ: f64 = 0.5;

/// Pass band of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    LowPass,
    HighPass,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterType::LowPass => write!(f, "lowpass"),
            FilterType::HighPass => write!(f, "highpass"),
        }
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lowpass" | "low" | "low-pass" => Ok(FilterType::LowPass),
            "highpass" | "high" | "high-pass" => Ok(FilterType::HighPass),
            other => Err(format!("unknown filter type '{other}' (expected lowpass or highpass)")),
        }
    }
}

/// Cutoff normalized to the Nyquist frequency for a given sampling rate.
///
/// Fails unless the result lies strictly inside `(0, 1)`.
pub fn normalized_cutoff(sampling_rate: f64) -> Result<f64> {
    if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
        return Err(ConditioningError::InvalidFilterParameters(format!(
            "sampling rate must be positive and finite, got {sampling_rate}"
        )));
    }

    let nyquist = 0.5 * sampling_rate;
    let cutoff = CUTOFF_FREQUENCY_HZ / nyquist;
    validate_cutoff(cutoff)?;
    Ok(cutoff)
}

fn validate_cutoff(cutoff: f64) -> Result<()> {
    if !(cutoff > 0.0 && cutoff < 1.0) {
        return Err(ConditioningError::InvalidFilterParameters(format!(
            "normalized cutoff {cutoff} must lie in (0, 1)"
        )));
    }
    Ok(())
}

/// A designed Butterworth filter ready to run over whole sequences.
#[derive(Debug, Clone)]
pub struct ButterworthFilter {
    filter_type: FilterType,
    cutoff: f64,
    b: Vec<f64>,
    a: Vec<f64>,
}

impl ButterworthFilter {
    /// The pipeline's filter: order 6 at the fixed cutoff for `sampling_rate`.
    pub fn new(sampling_rate: f64, filter_type: FilterType) -> Result<Self> {
        let cutoff = normalized_cutoff(sampling_rate)?;
        Self::design(BUTTERWORTH_ORDER, cutoff, filter_type)
    }

    /// Design a filter of arbitrary order at a normalized cutoff in `(0, 1)`.
    pub fn design(order: usize, cutoff: f64, filter_type: FilterType) -> Result<Self> {
        if order == 0 {
            return Err(ConditioningError::InvalidFilterParameters(
                "filter order must be at least 1".to_string(),
            ));
        }
        validate_cutoff(cutoff)?;

        // Digital design runs with fs = 2 so the cutoff is already normalized.
        let fs = 2.0;
        let warped = 2.0 * fs * (PI * cutoff / fs).tan();

        let prototype = prototype_poles(order);
        let (zeros, poles, gain) = match filter_type {
            FilterType::LowPass => lowpass_zpk(&prototype, warped),
            FilterType::HighPass => highpass_zpk(&prototype, warped),
        };
        let (zeros, poles, gain) = bilinear_zpk(&zeros, &poles, gain, fs);

        let b: Vec<f64> = poly(&zeros).iter().map(|c| c.re * gain).collect();
        let a: Vec<f64> = poly(&poles).iter().map(|c| c.re).collect();

        Ok(Self {
            filter_type,
            cutoff,
            b,
            a,
        })
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Normalized cutoff this filter was designed for.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Numerator coefficients.
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients, `a[0] == 1`.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Run the filter over `data` from a zero initial state.
    pub fn apply(&self, data: &[f64]) -> Vec<f64> {
        let a0 = self.a[0];
        let b: Vec<f64> = self.b.iter().map(|v| v / a0).collect();
        let a: Vec<f64> = self.a.iter().map(|v| v / a0).collect();
        let order = a.len() - 1;

        let mut state = vec![0.0; order];
        let mut out = Vec::with_capacity(data.len());

        for &x in data {
            let y = b[0] * x + state.first().copied().unwrap_or(0.0);
            for i in 0..order {
                let next = if i + 1 < order { state[i + 1] } else { 0.0 };
                state[i] = b[i + 1] * x + next - a[i + 1] * y;
            }
            out.push(y);
        }
        out
    }
}

/// Left-half-plane poles of the normalized analog Butterworth prototype.
fn prototype_poles(order: usize) -> Vec<Complex64> {
    let n = order as f64;
    (0..order)
        .map(|k| {
            let m = -n + 1.0 + 2.0 * k as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect()
}

type Zpk = (Vec<Complex64>, Vec<Complex64>, f64);

fn lowpass_zpk(prototype: &[Complex64], warped: f64) -> Zpk {
    let poles = prototype.iter().map(|p| *p * warped).collect();
    let gain = warped.powi(prototype.len() as i32);
    (Vec::new(), poles, gain)
}

fn highpass_zpk(prototype: &[Complex64], warped: f64) -> Zpk {
    let poles = prototype.iter().map(|p| warped / *p).collect();
    let zeros = vec![Complex64::new(0.0, 0.0); prototype.len()];
    let product: Complex64 = prototype.iter().map(|p| -*p).product();
    let gain = (Complex64::new(1.0, 0.0) / product).re;
    (zeros, poles, gain)
}

fn bilinear_zpk(zeros: &[Complex64], poles: &[Complex64], gain: f64, fs: f64) -> Zpk {
    let fs2 = Complex64::new(2.0 * fs, 0.0);

    let mut digital_zeros: Vec<Complex64> = zeros.iter().map(|z| (fs2 + *z) / (fs2 - *z)).collect();
    let digital_poles: Vec<Complex64> = poles.iter().map(|p| (fs2 + *p) / (fs2 - *p)).collect();

    // Zeros at infinity map to Nyquist.
    let degree = poles.len() - zeros.len();
    digital_zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(degree));

    let num: Complex64 = zeros.iter().map(|z| fs2 - *z).product();
    let den: Complex64 = poles.iter().map(|p| fs2 - *p).product();
    let digital_gain = gain * (num / den).re;

    (digital_zeros, digital_poles, digital_gain)
}

/// Coefficients of the monic polynomial with the given roots, highest power first.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for root in roots {
        let mut next = coeffs.clone();
        next.push(Complex64::new(0.0, 0.0));
        for i in 1..next.len() {
            next[i] -= *root * coeffs[i - 1];
        }
        coeffs = next;
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_cutoff_from_sampling_rate() {
        assert!((normalized_cutoff(50.0).unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_cutoff_at_or_above_nyquist_rejected() {
        for rate in [1.0, 0.5, 0.1] {
            assert!(matches!(
                normalized_cutoff(rate),
                Err(ConditioningError::InvalidFilterParameters(_))
            ));
        }
        assert!(ButterworthFilter::new(1.0, FilterType::LowPass).is_err());
    }

    #[test]
    fn test_bad_sampling_rate_rejected() {
        assert!(normalized_cutoff(0.0).is_err());
        assert!(normalized_cutoff(-10.0).is_err());
        assert!(normalized_cutoff(f64::NAN).is_err());
    }

    #[test]
    fn test_second_order_lowpass_coefficients() {
        let filter = ButterworthFilter::design(2, 0.5, FilterType::LowPass).unwrap();
        assert_close(filter.b(), &[0.292_893_22, 0.585_786_44, 0.292_893_22], 1e-7);
        assert_close(filter.a(), &[1.0, 0.0, 0.171_572_88], 1e-7);
    }

    #[test]
    fn test_second_order_highpass_coefficients() {
        let filter = ButterworthFilter::design(2, 0.5, FilterType::HighPass).unwrap();
        assert_close(filter.b(), &[0.292_893_22, -0.585_786_44, 0.292_893_22], 1e-7);
        assert_close(filter.a(), &[1.0, 0.0, 0.171_572_88], 1e-7);
    }

    #[test]
    fn test_sixth_order_has_seven_coefficients() {
        let filter = ButterworthFilter::new(4.0, FilterType::LowPass).unwrap();
        assert_eq!(filter.b().len(), BUTTERWORTH_ORDER + 1);
        assert_eq!(filter.a().len(), BUTTERWORTH_ORDER + 1);
        assert!((filter.cutoff() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_lowpass_unit_dc_gain() {
        let filter = ButterworthFilter::new(4.0, FilterType::LowPass).unwrap();
        let gain = filter.b().iter().sum::<f64>() / filter.a().iter().sum::<f64>();
        assert!((gain - 1.0).abs() < 1e-6);

        let out = filter.apply(&vec![1.0; 400]);
        assert!((out[399] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_highpass_rejects_dc_and_passes_nyquist() {
        let filter = ButterworthFilter::new(4.0, FilterType::HighPass).unwrap();
        let alt = |c: &[f64]| {
            c.iter()
                .enumerate()
                .map(|(i, v)| if i % 2 == 0 { *v } else { -*v })
                .sum::<f64>()
        };
        assert!((alt(filter.b()) / alt(filter.a()) - 1.0).abs() < 1e-6);

        let out = filter.apply(&vec![1.0; 400]);
        assert!(out[399].abs() < 1e-3);
    }

    #[test]
    fn test_output_length_matches_input() {
        let filter = ButterworthFilter::new(20.0, FilterType::HighPass).unwrap();
        assert_eq!(filter.apply(&[1.0, 2.0, 3.0]).len(), 3);
        assert!(filter.apply(&[]).is_empty());
    }

    #[test]
    fn test_filter_is_causal() {
        // An impulse at index 5 must leave the first five outputs untouched.
        let filter = ButterworthFilter::new(4.0, FilterType::LowPass).unwrap();
        let mut impulse = vec![0.0; 20];
        impulse[5] = 1.0;
        let out = filter.apply(&impulse);
        assert!(out[..5].iter().all(|v| *v == 0.0));
        assert!(out[5] > 0.0);
    }

    #[test]
    fn test_filter_type_parsing() {
        assert_eq!("lowpass".parse::<FilterType>().unwrap(), FilterType::LowPass);
        assert_eq!("High-Pass".parse::<FilterType>().unwrap(), FilterType::HighPass);
        assert!("bandpass".parse::<FilterType>().is_err());
        assert_eq!(FilterType::HighPass.to_string(), "highpass");
    }
}
