//! Tabular view of a feature matrix.

use polars::prelude::*;
use riskpeers_primitives::FeatureMatrix;

/// Render a feature matrix as a DataFrame with columns
/// `symbol | annual_return | volatility | beta`.
///
/// # Errors
/// Returns a polars error if the frame cannot be built.
pub fn feature_frame(matrix: &FeatureMatrix) -> PolarsResult<DataFrame> {
    let symbols: Vec<&str> = matrix.symbols().iter().map(|s| s.as_str()).collect();
    let annual_return: Vec<f64> = matrix.rows().iter().map(|f| f.annual_return).collect();
    let volatility: Vec<f64> = matrix.rows().iter().map(|f| f.volatility).collect();
    let beta: Vec<f64> = matrix.rows().iter().map(|f| f.beta).collect();

    DataFrame::new(vec![
        Column::new("symbol".into(), symbols),
        Column::new("annual_return".into(), annual_return),
        Column::new("volatility".into(), volatility),
        Column::new("beta".into(), beta),
    ])
}
