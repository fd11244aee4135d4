//! Risk feature vector computation.

use riskpeers_math::{population_covariance, population_std, population_variance};
use riskpeers_primitives::{LogReturns, PriceSeries, RiskFeatures};
use serde::{Deserialize, Serialize};

use crate::{FeatureError, align_returns};

/// Minimum number of prices needed to form one return.
const MIN_PRICES: usize = 2;

/// Configuration for risk feature computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Trading sessions per year used to annualize daily statistics.
    pub trading_days: u32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { trading_days: 252 }
    }
}

/// Geometric-compounded annualized return of a return series.
///
/// Computes `prod(1 + r_i)^(trading_days / n) - 1`. An empty series yields
/// `0.0`.
#[must_use]
pub fn annualized_return(returns: &[f64], trading_days: u32) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    growth.powf(f64::from(trading_days) / returns.len() as f64) - 1.0
}

/// Annualized population standard deviation of a return series.
///
/// An empty series yields `0.0`.
#[must_use]
pub fn annualized_volatility(returns: &[f64], trading_days: u32) -> f64 {
    population_std(returns).map_or(0.0, |std| std * f64::from(trading_days).sqrt())
}

/// `cov(stock, benchmark) / var(benchmark)` with population moments.
///
/// Both slices must already be aligned on date. Returns `NaN` when the
/// benchmark variance is zero or there are no observations.
#[must_use]
pub fn beta(stock: &[f64], benchmark: &[f64]) -> f64 {
    let Ok(variance) = population_variance(benchmark) else {
        return f64::NAN;
    };
    if variance == 0.0 {
        return f64::NAN;
    }
    population_covariance(stock, benchmark).map_or(f64::NAN, |cov| cov / variance)
}

/// Builds risk feature vectors from price histories.
///
/// Stateless apart from its configuration; identical inputs always produce
/// identical features.
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    config: FeatureConfig,
}

impl FeatureEngineer {
    /// Create a feature engineer with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FeatureConfig::default())
    }

    /// Create a feature engineer with custom configuration.
    #[must_use]
    pub const fn with_config(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Beta of `stock` to `benchmark` over the dates both series share.
    ///
    /// # Errors
    /// Returns `FeatureError::Polars` if the date join fails.
    pub fn beta(&self, stock: &LogReturns, benchmark: &LogReturns) -> Result<f64, FeatureError> {
        let aligned = align_returns(stock, benchmark)?;
        let b = beta(&aligned.stock, &aligned.benchmark);
        if b.is_nan() {
            tracing::debug!(common_dates = aligned.len(), "beta undefined for aligned window");
        }
        Ok(b)
    }

    /// Build the `(annual_return, volatility, beta)` vector of a ticker.
    ///
    /// # Errors
    /// Returns `FeatureError::InsufficientData` if either series has fewer
    /// than two prices.
    pub fn build_features(
        &self,
        prices: &PriceSeries,
        benchmark: &PriceSeries,
    ) -> Result<RiskFeatures, FeatureError> {
        for series in [prices, benchmark] {
            if series.len() < MIN_PRICES {
                return Err(FeatureError::InsufficientData {
                    required: MIN_PRICES,
                    actual: series.len(),
                });
            }
        }

        let returns = prices.log_returns();
        let benchmark_returns = benchmark.log_returns();
        let trading_days = self.config.trading_days;

        Ok(RiskFeatures::new(
            annualized_return(returns.values(), trading_days),
            annualized_volatility(returns.values(), trading_days),
            self.beta(&returns, &benchmark_returns)?,
        ))
    }
}
