//! Mean removal and axis merging.

use crate::error::{ConditioningError, Result};
use crate::recording::Axes;
use statrs::statistics::Statistics;

/// Subtract the arithmetic mean of `values` from every element.
///
/// An empty sequence has no mean and is rejected.
pub fn normalize_sequence(values: &mut [f64]) -> Result<()> {
    if values.is_empty() {
        return Err(ConditioningError::InvalidInput(
            "cannot normalize an empty sequence".to_string(),
        ));
    }

    let mean = values.iter().mean();
    for value in values.iter_mut() {
        *value -= mean;
    }
    Ok(())
}

/// Normalize x, y and z independently.
pub fn normalize(axes: &mut Axes) -> Result<()> {
    for axis in axes.each_mut() {
        normalize_sequence(axis)?;
    }
    Ok(())
}

/// Collapse three axes into their per-sample mean.
pub fn merge(axes: &Axes) -> Result<Vec<f64>> {
    if axes.is_empty() {
        return Err(ConditioningError::InvalidInput(
            "cannot merge empty axes".to_string(),
        ));
    }

    Ok(axes
        .x
        .iter()
        .zip(&axes.y)
        .zip(&axes.z)
        .map(|((x, y), z)| (x + y + z) / 3.0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn test_normalized_axes_have_zero_mean() {
        let mut axes = Axes::new(
            vec![1.0, 2.0, 3.0, 10.0],
            vec![-4.0, 0.5, 0.25, 9.81],
            vec![100.0, 101.0, 99.0, 100.5],
        )
        .unwrap();

        normalize(&mut axes).unwrap();

        assert!(mean(&axes.x).abs() < 1e-12);
        assert!(mean(&axes.y).abs() < 1e-12);
        assert!(mean(&axes.z).abs() < 1e-12);
        assert!((axes.x[0] - (1.0 - 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_empty_is_invalid() {
        let mut empty: Vec<f64> = Vec::new();
        assert!(matches!(
            normalize_sequence(&mut empty),
            Err(ConditioningError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_merge_exact_mean() {
        let axes = Axes::new(vec![3.0], vec![0.0], vec![0.0]).unwrap();
        assert_eq!(merge(&axes).unwrap(), vec![1.0]);

        let axes = Axes::new(vec![1.0, 0.1], vec![2.0, 0.2], vec![6.0, 0.3]).unwrap();
        let merged = merge(&axes).unwrap();
        assert_eq!(merged[0], (1.0 + 2.0 + 6.0) / 3.0);
        assert_eq!(merged[1], (0.1 + 0.2 + 0.3) / 3.0);
    }

    #[test]
    fn test_merge_empty_is_invalid() {
        let axes = Axes::new(vec![], vec![], vec![]).unwrap();
        assert!(merge(&axes).is_err());
    }
}
