//! Nearest-peer ranking within a risk cluster.

use riskpeers_math::euclidean_distance;
use riskpeers_primitives::{ClusterAssignment, FeatureMatrix, Symbol};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Configuration for peer grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrouperConfig {
    /// Peers returned when the caller does not ask for a count.
    pub default_peer_count: usize,
}

impl Default for GrouperConfig {
    fn default() -> Self {
        Self { default_peer_count: 4 }
    }
}

/// A cluster peer and its feature-space distance to the query ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct Peer {
    /// Peer ticker.
    pub symbol: Symbol,
    /// Euclidean distance in risk-feature space.
    pub distance: f64,
}

/// Ranks the tickers sharing a query ticker's cluster by feature distance.
#[derive(Debug, Clone, Default)]
pub struct RiskGrouper {
    config: GrouperConfig,
}

impl RiskGrouper {
    /// Create a grouper with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grouper with custom configuration.
    #[must_use]
    pub const fn with_config(config: GrouperConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &GrouperConfig {
        &self.config
    }

    /// Up to `default_peer_count` nearest cluster peers of `ticker`.
    ///
    /// # Errors
    /// See [`group_n`](Self::group_n).
    pub fn group(
        &self,
        ticker: &Symbol,
        matrix: &FeatureMatrix,
        assignment: &ClusterAssignment,
    ) -> Result<Vec<Symbol>, ModelError> {
        self.group_n(ticker, matrix, assignment, self.config.default_peer_count)
    }

    /// Up to `n` nearest cluster peers of `ticker`, nearest first.
    ///
    /// # Errors
    /// Returns `ModelError::TickerNotInMatrix` or
    /// `ModelError::TickerNotAssigned` if `ticker` is missing from either
    /// input, or `ModelError::Primitive` if the two inputs cover different
    /// tickers.
    pub fn group_n(
        &self,
        ticker: &Symbol,
        matrix: &FeatureMatrix,
        assignment: &ClusterAssignment,
        n: usize,
    ) -> Result<Vec<Symbol>, ModelError> {
        Ok(self.ranked_peers(ticker, matrix, assignment, n)?.into_iter().map(|p| p.symbol).collect())
    }

    /// Like [`group_n`](Self::group_n) but keeps each peer's distance.
    ///
    /// Equal distances keep the row order of `assignment`.
    ///
    /// # Errors
    /// See [`group_n`](Self::group_n).
    pub fn ranked_peers(
        &self,
        ticker: &Symbol,
        matrix: &FeatureMatrix,
        assignment: &ClusterAssignment,
        n: usize,
    ) -> Result<Vec<Peer>, ModelError> {
        let query = matrix
            .get(ticker)
            .ok_or_else(|| ModelError::TickerNotInMatrix(ticker.clone()))?
            .to_array();
        let label =
            assignment.label(ticker).ok_or_else(|| ModelError::TickerNotAssigned(ticker.clone()))?;
        assignment.check_matches(matrix)?;

        let mut peers: Vec<Peer> = assignment
            .members(label)
            .filter(|s| *s != ticker)
            .filter_map(|s| {
                matrix.get(s).map(|f| Peer {
                    symbol: s.clone(),
                    distance: euclidean_distance(&query, &f.to_array()),
                })
            })
            .collect();
        peers.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        peers.truncate(n);
        Ok(peers)
    }
}
