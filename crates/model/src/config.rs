//! End-to-end configuration.

use std::{fs, ops::RangeInclusive, path::Path};

use riskpeers_features::FeatureConfig;
use riskpeers_primitives::{HistoryWindow, Symbol};
use serde::{Deserialize, Serialize};

use crate::{ClusterConfig, GrouperConfig, ModelError};

/// Settings for a peer search, loadable from JSON.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Trading sessions per year.
    pub trading_days: u32,
    /// Peers returned per query.
    pub default_peer_count: usize,
    /// Candidate cluster counts for the elbow search.
    pub k_search_range: RangeInclusive<usize>,
    /// Seed for k-means initialization.
    pub random_seed: u64,
    /// Fit elbow candidates concurrently.
    pub parallel: bool,
    /// Benchmark ticker for beta.
    pub benchmark: Symbol,
    /// Price history requested per ticker.
    pub window: HistoryWindow,
}

impl Default for RiskConfig {
    fn default() -> Self {
        let clusters = ClusterConfig::default();
        Self {
            trading_days: FeatureConfig::default().trading_days,
            default_peer_count: GrouperConfig::default().default_peer_count,
            k_search_range: clusters.k_search_range,
            random_seed: clusters.random_seed,
            parallel: clusters.parallel,
            benchmark: Symbol::new("SPY"),
            window: HistoryWindow::default(),
        }
    }
}

impl RiskConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` if the JSON is malformed or the
    /// cluster settings are invalid.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
        config.clusters().validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` if the file cannot be read or
    /// parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ModelError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Feature computation settings.
    #[must_use]
    pub const fn features(&self) -> FeatureConfig {
        FeatureConfig { trading_days: self.trading_days }
    }

    /// Cluster fitting settings.
    #[must_use]
    pub fn clusters(&self) -> ClusterConfig {
        ClusterConfig {
            k_search_range: self.k_search_range.clone(),
            random_seed: self.random_seed,
            parallel: self.parallel,
            ..ClusterConfig::default()
        }
    }

    /// Peer grouping settings.
    #[must_use]
    pub const fn grouper(&self) -> GrouperConfig {
        GrouperConfig { default_peer_count: self.default_peer_count }
    }
}
