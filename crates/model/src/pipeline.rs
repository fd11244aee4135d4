//! Sector peer search from raw prices to ranked peers.

use chrono::{DateTime, Utc};
use riskpeers_features::FeatureEngineer;
use riskpeers_primitives::{ClusterModel, FeatureMatrix, PriceSeries, RiskFeatures, Symbol};
use riskpeers_traits::{ModelStore, PriceProvider, SectorLookup};

use crate::{ClusterModelManager, ModelError, RiskConfig, RiskGrouper};

/// Outcome of a peer search for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerReport {
    /// Query ticker.
    pub symbol: Symbol,
    /// Sector of the query ticker.
    pub sector: String,
    /// Model used for the search; hand it back to the next search.
    pub model: ClusterModel,
    /// Risk features of the query ticker.
    pub query_features: RiskFeatures,
    /// Nearest cluster peers, nearest first.
    pub peers: Vec<(Symbol, RiskFeatures)>,
    /// Sector members left out for missing data or non-finite features.
    pub dropped: Vec<Symbol>,
}

impl PeerReport {
    /// Number of clusters in the sector model.
    #[must_use]
    pub fn k(&self) -> usize {
        self.model.k()
    }

    /// Query row followed by the peer rows.
    #[must_use]
    pub fn feature_matrix(&self) -> FeatureMatrix {
        std::iter::once((self.symbol.clone(), self.query_features))
            .chain(self.peers.iter().cloned())
            .collect()
    }
}

/// Finds the risk peers of a ticker among the members of its sector.
#[derive(Debug)]
pub struct PeerSearch<P, L, S> {
    prices: P,
    sectors: L,
    store: S,
    config: RiskConfig,
}

impl<P, L, S> PeerSearch<P, L, S>
where
    P: PriceProvider,
    L: SectorLookup,
    S: ModelStore,
{
    /// Create a peer search over the given collaborators.
    #[must_use]
    pub const fn new(prices: P, sectors: L, store: S, config: RiskConfig) -> Self {
        Self { prices, sectors, store, config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Risk features of every member of `sector`, plus `query` if it is not
    /// listed. Members whose prices cannot be fetched or whose features
    /// cannot be built are skipped and returned alongside the matrix.
    ///
    /// # Errors
    /// Returns `ModelError` if the sector or benchmark cannot be fetched or
    /// if `query` itself fails.
    pub fn sector_features(
        &self,
        sector: &str,
        query: &Symbol,
    ) -> Result<(FeatureMatrix, Vec<Symbol>), ModelError> {
        let mut members = self.sectors.sector_members(sector)?;
        if !members.contains(query) {
            members.push(query.clone());
        }

        let window = self.config.window;
        let benchmark = self.prices.fetch_prices(&self.config.benchmark, &window)?;
        let engineer = FeatureEngineer::with_config(self.config.features());

        let mut matrix = FeatureMatrix::new();
        let mut skipped = Vec::new();
        for symbol in members {
            match self.member_features(&engineer, &symbol, &benchmark) {
                Ok(features) => {
                    if let Err(e) = matrix.insert(symbol, features) {
                        tracing::warn!(error = %e, "duplicate sector member");
                    }
                }
                Err(e) if symbol != *query => {
                    tracing::warn!(%symbol, error = %e, "skipping sector member");
                    skipped.push(symbol);
                }
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(sector, rows = matrix.len(), skipped = skipped.len(), "built sector features");
        Ok((matrix, skipped))
    }

    fn member_features(
        &self,
        engineer: &FeatureEngineer,
        symbol: &Symbol,
        benchmark: &PriceSeries,
    ) -> Result<RiskFeatures, ModelError> {
        let prices = self.prices.fetch_prices(symbol, &self.config.window)?;
        engineer
            .build_features(&prices, benchmark)
            .map_err(|e| ModelError::Feature(e.for_symbol(symbol)))
    }

    /// Run the peer search for `query`.
    ///
    /// `held` is the sector model from a previous search, if any. Without a
    /// held model for the sector, the persisted one is loaded. Either is
    /// reused while the persisted copy is fresh as of `now`; otherwise a new
    /// model is fit and saved. The model used is returned in the report.
    ///
    /// Members whose features cannot be clustered are dropped.
    ///
    /// # Errors
    /// Returns `ModelError::NonFiniteFeatures` if the query ticker's
    /// features cannot be clustered, or any lookup, retrieval, fitting, or
    /// persistence error.
    pub fn run(
        &self,
        query: &Symbol,
        held: Option<ClusterModel>,
        now: DateTime<Utc>,
    ) -> Result<PeerReport, ModelError> {
        let sector = self.sectors.sector_of(query)?;
        let (raw, mut dropped) = self.sector_features(&sector, query)?;

        let (matrix, unusable) = raw.partition_clusterable();
        if !unusable.is_empty() {
            tracing::warn!(%sector, tickers = ?unusable, "dropping tickers with unclusterable features");
            if unusable.contains(query) {
                return Err(ModelError::NonFiniteFeatures(vec![query.clone()]));
            }
            dropped.extend(unusable);
        }

        let manager = ClusterModelManager::with_config(&sector, &self.store, self.config.clusters())?;
        let held = match held.filter(|m| &m.sector == manager.sector()) {
            Some(model) => Some(model),
            None => manager.fresh_persisted(now)?,
        };
        let model = manager.fit(held, &matrix, now)?;
        let (model, assignment) = manager.predict(Some(model), &matrix)?;

        let grouper = RiskGrouper::with_config(self.config.grouper());
        let peers = grouper
            .group(query, &matrix, &assignment)?
            .into_iter()
            .filter_map(|s| matrix.get(&s).copied().map(|f| (s, f)))
            .collect();
        let query_features =
            *matrix.get(query).ok_or_else(|| ModelError::TickerNotInMatrix(query.clone()))?;

        tracing::info!(symbol = %query, %sector, k = model.k(), "peer search complete");
        Ok(PeerReport { symbol: query.clone(), sector, model, query_features, peers, dropped })
    }
}
