//! Population moments and distances.

use crate::MathError;

/// Arithmetic mean.
///
/// # Errors
/// Returns `MathError::EmptyData` for an empty slice.
pub fn mean(data: &[f64]) -> Result<f64, MathError> {
    if data.is_empty() {
        return Err(MathError::EmptyData);
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population variance (divisor `n`).
///
/// # Errors
/// Returns `MathError::EmptyData` for an empty slice.
pub fn population_variance(data: &[f64]) -> Result<f64, MathError> {
    let m = mean(data)?;
    Ok(data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64)
}

/// Population standard deviation (divisor `n`).
///
/// # Errors
/// Returns `MathError::EmptyData` for an empty slice.
pub fn population_std(data: &[f64]) -> Result<f64, MathError> {
    population_variance(data).map(f64::sqrt)
}

/// Population covariance (divisor `n`) of two equally long slices.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if the lengths differ and
/// `MathError::EmptyData` if both are empty.
pub fn population_covariance(x: &[f64], y: &[f64]) -> Result<f64, MathError> {
    if x.len() != y.len() {
        return Err(MathError::DimensionMismatch { expected: x.len(), actual: y.len() });
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let sum: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    Ok(sum / x.len() as f64)
}

/// Squared Euclidean distance between two points.
#[must_use]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Euclidean distance between two points.
#[must_use]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}
