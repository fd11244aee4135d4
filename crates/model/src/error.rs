//! Error types for clustering and peer grouping.

use riskpeers_features::FeatureError;
use riskpeers_math::MathError;
use riskpeers_primitives::{PrimitiveError, SectorKey, Symbol};
use riskpeers_traits::{ProviderError, StoreError};

/// Errors that can occur while clustering or grouping tickers.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No model in hand and none persisted for the sector.
    #[error("no cluster model available for sector {0}; fit one first")]
    ModelUnavailable(SectorKey),

    /// Query ticker has no row in the feature matrix.
    #[error("ticker {0} not in feature matrix")]
    TickerNotInMatrix(Symbol),

    /// Query ticker has no cluster label.
    #[error("ticker {0} not in cluster assignment")]
    TickerNotAssigned(Symbol),

    /// Feature rows with NaN, infinite, or overflowing values cannot be
    /// clustered.
    #[error("non-finite or overflowing features for {0:?}")]
    NonFiniteFeatures(Vec<Symbol>),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data validation error.
    #[error("invalid data: {0}")]
    Primitive(#[from] PrimitiveError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Feature computation error.
    #[error("feature error: {0}")]
    Feature(#[from] FeatureError),

    /// Market data retrieval error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Model persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ModelError {
    /// Returns whether the caller can recover by fitting or retrying.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::ModelUnavailable(_) => true,
            Self::Provider(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::TickerNotInMatrix("AAPL".into());
        assert_eq!(err.to_string(), "ticker AAPL not in feature matrix");

        let err = ModelError::ModelUnavailable(SectorKey::new("Basic Materials"));
        assert!(err.to_string().contains("basic_materials"));
    }

    #[test]
    fn error_is_recoverable() {
        assert!(ModelError::ModelUnavailable(SectorKey::new("Energy")).is_recoverable());

        let err = ModelError::Provider(ProviderError::Retrieval {
            symbol: "AAPL".into(),
            reason: "timeout".to_string(),
        });
        assert!(err.is_recoverable());

        assert!(!ModelError::TickerNotAssigned("AAPL".into()).is_recoverable());
    }
}
