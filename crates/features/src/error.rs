//! Error types for feature engineering.

use riskpeers_primitives::Symbol;

/// Errors that can occur while building risk features.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Too few prices to form a return.
    #[error("insufficient data: need at least {required} prices, got {actual}")]
    InsufficientData {
        /// Required number of prices.
        required: usize,
        /// Actual number of prices.
        actual: usize,
    },

    /// Feature computation failed for a specific ticker.
    #[error("feature computation failed for {symbol}: {source}")]
    Ticker {
        /// Ticker being processed.
        symbol: Symbol,
        /// Underlying error.
        #[source]
        source: Box<Self>,
    },

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] riskpeers_math::MathError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl FeatureError {
    /// Attach the ticker being processed.
    #[must_use]
    pub fn for_symbol(self, symbol: &Symbol) -> Self {
        Self::Ticker { symbol: symbol.clone(), source: Box::new(self) }
    }
}
