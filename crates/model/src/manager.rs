//! Cluster model fitting, persistence, and prediction.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use rayon::prelude::*;
use riskpeers_math::{KMeans, KMeansFit, MathError, select_elbow};
use riskpeers_primitives::{ClusterAssignment, ClusterModel, FeatureMatrix, N_FEATURES, SectorKey};
use riskpeers_traits::ModelStore;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Configuration for cluster model fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Candidate cluster counts for the elbow search.
    pub k_search_range: RangeInclusive<usize>,
    /// Seed for every k-means initialization.
    pub random_seed: u64,
    /// Maximum Lloyd iterations per fit.
    pub max_iterations: usize,
    /// Relative convergence tolerance per fit.
    pub tolerance: f64,
    /// Fit the elbow candidates concurrently.
    pub parallel: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k_search_range: 1..=10,
            random_seed: 42,
            max_iterations: 300,
            tolerance: 1e-4,
            parallel: false,
        }
    }
}

impl ClusterConfig {
    /// Check the search range and iteration limits.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` if the range is empty or starts
    /// at zero, or if no iterations are allowed.
    pub fn validate(&self) -> Result<(), ModelError> {
        let (start, end) = (*self.k_search_range.start(), *self.k_search_range.end());
        if start == 0 {
            return Err(ModelError::InvalidConfig("k_search_range must start at 1 or more".into()));
        }
        if start > end {
            return Err(ModelError::InvalidConfig(format!("empty k_search_range {start}..={end}")));
        }
        if self.max_iterations == 0 {
            return Err(ModelError::InvalidConfig("max_iterations must be positive".into()));
        }
        Ok(())
    }

    fn kmeans(&self, k: usize) -> KMeans {
        KMeans::new(k, self.random_seed)
            .with_max_iterations(self.max_iterations)
            .with_tolerance(self.tolerance)
    }
}

/// Fits, persists, and applies the risk cluster model of one sector.
///
/// The fitted model is an explicit value: callers pass the model they hold
/// (if any) into [`fit`](Self::fit), [`load`](Self::load) and
/// [`predict`](Self::predict) and keep the one handed back.
#[derive(Debug, Clone)]
pub struct ClusterModelManager<S> {
    sector: SectorKey,
    store: S,
    config: ClusterConfig,
}

impl<S: ModelStore> ClusterModelManager<S> {
    /// Create a manager for `sector` with default configuration.
    #[must_use]
    pub fn new(sector: &str, store: S) -> Self {
        Self { sector: SectorKey::new(sector), store, config: ClusterConfig::default() }
    }

    /// Create a manager with custom configuration.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` if the configuration is invalid.
    pub fn with_config(sector: &str, store: S, config: ClusterConfig) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self { sector: SectorKey::new(sector), store, config })
    }

    /// Storage key of the managed sector.
    #[must_use]
    pub const fn sector(&self) -> &SectorKey {
        &self.sector
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Get the model store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Inertia of a seeded k-means fit for each candidate cluster count.
    ///
    /// Candidates above the number of rows are skipped. Results are in
    /// ascending `k` order whether or not the sweep runs in parallel.
    ///
    /// # Errors
    /// Returns `ModelError::Math` if no candidate fits the data or a fit fails.
    pub fn inertia_curve(&self, data: &Array2<f64>) -> Result<Vec<(usize, f64)>, ModelError> {
        let samples = data.nrows();
        let start = *self.config.k_search_range.start();
        let end = (*self.config.k_search_range.end()).min(samples);
        if start > end {
            return Err(MathError::TooManyClusters { k: start, samples }.into());
        }
        let ks: Vec<usize> = (start..=end).collect();

        let (config, sector) = (&self.config, &self.sector);
        let fit = |k: usize| -> Result<(usize, f64), MathError> {
            let inertia = config.kmeans(k).fit(data)?.inertia;
            tracing::debug!(%sector, k, inertia, "elbow candidate");
            Ok((k, inertia))
        };
        let curve = if self.config.parallel {
            ks.par_iter().map(|&k| fit(k)).collect::<Result<Vec<_>, _>>()?
        } else {
            ks.iter().map(|&k| fit(k)).collect::<Result<Vec<_>, _>>()?
        };
        Ok(curve)
    }

    /// Cluster count at the elbow of the inertia curve.
    ///
    /// # Errors
    /// See [`inertia_curve`](Self::inertia_curve).
    pub fn select_k(&self, data: &Array2<f64>) -> Result<usize, ModelError> {
        let (ks, inertias): (Vec<usize>, Vec<f64>) = self.inertia_curve(data)?.into_iter().unzip();
        Ok(select_elbow(&ks, &inertias)?)
    }

    /// Run the elbow search and fit the final model without persisting it.
    ///
    /// # Errors
    /// Returns `ModelError::NonFiniteFeatures` if any row has a feature that
    /// is not clusterable (NaN, infinite, or too large to square), or
    /// `ModelError::Math` if the matrix is empty.
    pub fn fit_fresh(
        &self,
        matrix: &FeatureMatrix,
        now: DateTime<Utc>,
    ) -> Result<ClusterModel, ModelError> {
        let (_, dropped) = matrix.partition_clusterable();
        if !dropped.is_empty() {
            return Err(ModelError::NonFiniteFeatures(dropped));
        }
        if matrix.is_empty() {
            return Err(MathError::EmptyData.into());
        }

        let data = matrix.to_array();
        let k = self.select_k(&data)?;
        let fit = self.config.kmeans(k).fit(&data)?;
        tracing::info!(sector = %self.sector, k, inertia = fit.inertia, rows = matrix.len(), "fitted cluster model");
        Ok(ClusterModel::new(self.sector.clone(), centroid_rows(&fit), fit.inertia, now))
    }

    /// Fit a model for `matrix` and persist it, unless `held` is a model for
    /// this sector whose persisted copy is still fresh as of `now`.
    ///
    /// # Errors
    /// Returns `ModelError` if fitting fails or the model cannot be saved.
    pub fn fit(
        &self,
        held: Option<ClusterModel>,
        matrix: &FeatureMatrix,
        now: DateTime<Utc>,
    ) -> Result<ClusterModel, ModelError> {
        if let Some(model) = held.filter(|m| m.sector == self.sector)
            && !self.store.is_stale(&self.sector, now)?
        {
            tracing::debug!(sector = %self.sector, k = model.k(), "reusing fresh cluster model");
            return Ok(model);
        }

        let model = self.fit_fresh(matrix, now)?;
        self.store.save(&model, &self.sector)?;
        Ok(model)
    }

    /// The persisted model, if there is one and it is fresh as of `now`.
    ///
    /// # Errors
    /// Returns `ModelError::Store` if the store cannot be read.
    pub fn fresh_persisted(&self, now: DateTime<Utc>) -> Result<Option<ClusterModel>, ModelError> {
        if self.store.is_stale(&self.sector, now)? {
            return Ok(None);
        }
        let model = self.store.load(&self.sector)?;
        if let Some(model) = &model {
            tracing::debug!(sector = %self.sector, k = model.k(), "loaded fresh persisted model");
        }
        Ok(model)
    }

    /// Return `held` if given, otherwise load the persisted model.
    ///
    /// # Errors
    /// Returns `ModelError::ModelUnavailable` if nothing is held or stored.
    pub fn load(&self, held: Option<ClusterModel>) -> Result<ClusterModel, ModelError> {
        if let Some(model) = held {
            return Ok(model);
        }
        self.store.load(&self.sector)?.ok_or_else(|| ModelError::ModelUnavailable(self.sector.clone()))
    }

    /// Label every row of `matrix` with its nearest centroid, loading the
    /// persisted model if none is held. The model used is handed back.
    ///
    /// # Errors
    /// Returns `ModelError::ModelUnavailable` if no model can be obtained.
    pub fn predict(
        &self,
        held: Option<ClusterModel>,
        matrix: &FeatureMatrix,
    ) -> Result<(ClusterModel, ClusterAssignment), ModelError> {
        let model = self.load(held)?;
        let assignment = model.assign(matrix);
        Ok((model, assignment))
    }
}

fn centroid_rows(fit: &KMeansFit) -> Vec<[f64; N_FEATURES]> {
    fit.centroids
        .rows()
        .into_iter()
        .map(|row| {
            let mut c = [0.0; N_FEATURES];
            for (dst, src) in c.iter_mut().zip(row.iter()) {
                *dst = *src;
            }
            c
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        collections::HashMap,
    };

    use riskpeers_primitives::{RiskFeatures, Symbol};
    use riskpeers_traits::StoreError;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        models: RefCell<HashMap<SectorKey, ClusterModel>>,
        stale: Cell<bool>,
        saves: Cell<usize>,
    }

    impl ModelStore for MemoryStore {
        fn save(&self, model: &ClusterModel, key: &SectorKey) -> Result<(), StoreError> {
            self.saves.set(self.saves.get() + 1);
            self.models.borrow_mut().insert(key.clone(), model.clone());
            Ok(())
        }

        fn load(&self, key: &SectorKey) -> Result<Option<ClusterModel>, StoreError> {
            Ok(self.models.borrow().get(key).cloned())
        }

        fn is_stale(&self, key: &SectorKey, _now: DateTime<Utc>) -> Result<bool, StoreError> {
            Ok(self.stale.get() || !self.models.borrow().contains_key(key))
        }
    }

    fn blobs() -> FeatureMatrix {
        let rows = [
            ("A", [0.10, 0.20, 1.00]),
            ("B", [0.11, 0.21, 1.05]),
            ("C", [0.09, 0.19, 0.98]),
            ("D", [0.12, 0.22, 1.02]),
            ("E", [0.80, 0.90, 2.50]),
            ("F", [0.82, 0.88, 2.45]),
            ("G", [0.79, 0.91, 2.55]),
            ("H", [-0.40, 0.60, 0.20]),
            ("I", [-0.42, 0.62, 0.25]),
            ("J", [-0.38, 0.58, 0.18]),
            ("K", [-0.41, 0.61, 0.22]),
            ("L", [0.81, 0.89, 2.48]),
        ];
        rows.into_iter().map(|(s, f)| (Symbol::from(s), RiskFeatures::from(f))).collect()
    }

    #[test]
    fn cluster_config_defaults() {
        let config = ClusterConfig::default();
        assert_eq!(config.k_search_range, 1..=10);
        assert_eq!(config.random_seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cluster_config_rejects_bad_ranges() {
        let zero = ClusterConfig { k_search_range: 0..=5, ..Default::default() };
        assert!(matches!(zero.validate(), Err(ModelError::InvalidConfig(_))));

        #[allow(clippy::reversed_empty_ranges)]
        let empty = ClusterConfig { k_search_range: 5..=2, ..Default::default() };
        assert!(ClusterModelManager::with_config("Tech", MemoryStore::default(), empty).is_err());
    }

    #[test]
    fn inertia_curve_clipped_to_rows() {
        let manager = ClusterModelManager::new("Tech", MemoryStore::default());
        let small: FeatureMatrix = blobs().iter().take(4).map(|(s, f)| (s.clone(), *f)).collect();
        let curve = manager.inertia_curve(&small.to_array()).unwrap();
        let ks: Vec<usize> = curve.iter().map(|(k, _)| *k).collect();
        assert_eq!(ks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn fit_is_deterministic() {
        let store = MemoryStore::default();
        let manager = ClusterModelManager::new("Technology", &store);
        let now = Utc::now();

        let first = manager.fit_fresh(&blobs(), now).unwrap();
        let second = manager.fit_fresh(&blobs(), now).unwrap();
        assert_eq!(first.k(), second.k());
        assert_eq!(first.centroids, second.centroids);
    }

    #[test]
    fn parallel_sweep_matches_sequential() {
        let sequential = ClusterModelManager::new("Tech", MemoryStore::default());
        let parallel = ClusterModelManager::with_config(
            "Tech",
            MemoryStore::default(),
            ClusterConfig { parallel: true, ..Default::default() },
        )
        .unwrap();

        let data = blobs().to_array();
        assert_eq!(sequential.inertia_curve(&data).unwrap(), parallel.inertia_curve(&data).unwrap());
        let now = Utc::now();
        assert_eq!(
            sequential.fit_fresh(&blobs(), now).unwrap(),
            parallel.fit_fresh(&blobs(), now).unwrap()
        );
    }

    #[test]
    fn fit_persists_and_reuses_fresh_model() {
        let store = MemoryStore::default();
        let manager = ClusterModelManager::new("Technology", &store);
        let now = Utc::now();

        let model = manager.fit(None, &blobs(), now).unwrap();
        assert_eq!(store.saves.get(), 1);
        assert_eq!(store.load(manager.sector()).unwrap(), Some(model.clone()));

        let reused = manager.fit(Some(model.clone()), &blobs(), now).unwrap();
        assert_eq!(reused, model);
        assert_eq!(store.saves.get(), 1);

        store.stale.set(true);
        manager.fit(Some(model), &blobs(), now).unwrap();
        assert_eq!(store.saves.get(), 2);
    }

    #[test]
    fn fit_refits_model_of_other_sector() {
        let store = MemoryStore::default();
        let energy = ClusterModelManager::new("Energy", &store);
        let tech = ClusterModelManager::new("Technology", &store);
        let now = Utc::now();

        let energy_model = energy.fit(None, &blobs(), now).unwrap();
        let tech_model = tech.fit(Some(energy_model), &blobs(), now).unwrap();
        assert_eq!(tech_model.sector, SectorKey::new("Technology"));
        assert_eq!(store.saves.get(), 2);
    }

    #[test]
    fn fresh_persisted_respects_staleness() {
        let store = MemoryStore::default();
        let manager = ClusterModelManager::new("Technology", &store);
        let now = Utc::now();
        assert_eq!(manager.fresh_persisted(now).unwrap(), None);

        let model = manager.fit(None, &blobs(), now).unwrap();
        assert_eq!(manager.fresh_persisted(now).unwrap(), Some(model));

        store.stale.set(true);
        assert_eq!(manager.fresh_persisted(now).unwrap(), None);
    }

    #[test]
    fn fit_rejects_overflowing_rows() {
        let mut matrix = blobs();
        matrix.insert("JUMP".into(), RiskFeatures::new(5e199, 0.0, 1.1)).unwrap();
        let manager = ClusterModelManager::new("Tech", MemoryStore::default());

        let err = manager.fit(None, &matrix, Utc::now()).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteFeatures(ref s) if s == &[Symbol::from("JUMP")]));
    }

    #[test]
    fn fit_rejects_non_finite_rows() {
        let mut matrix = blobs();
        matrix.insert("NAN".into(), RiskFeatures::new(0.1, 0.2, f64::NAN)).unwrap();
        let manager = ClusterModelManager::new("Tech", MemoryStore::default());

        let err = manager.fit(None, &matrix, Utc::now()).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteFeatures(ref s) if s == &[Symbol::from("NAN")]));
    }

    #[test]
    fn fit_rejects_empty_matrix() {
        let manager = ClusterModelManager::new("Tech", MemoryStore::default());
        let err = manager.fit(None, &FeatureMatrix::new(), Utc::now()).unwrap_err();
        assert!(matches!(err, ModelError::Math(MathError::EmptyData)));
    }

    #[test]
    fn predict_without_model_is_unavailable() {
        let manager = ClusterModelManager::new("Utilities", MemoryStore::default());
        let err = manager.predict(None, &blobs()).unwrap_err();
        assert!(matches!(err, ModelError::ModelUnavailable(ref k) if k.as_str() == "utilities"));
    }

    #[test]
    fn predict_loads_persisted_model() {
        let store = MemoryStore::default();
        let manager = ClusterModelManager::new("Technology", &store);
        let fitted = manager.fit(None, &blobs(), Utc::now()).unwrap();

        let (loaded, assignment) = manager.predict(None, &blobs()).unwrap();
        assert_eq!(loaded, fitted);
        assert_eq!(assignment.len(), blobs().len());
        assert!(assignment.check_matches(&blobs()).is_ok());
    }

    #[test]
    fn predict_groups_blobs_together() {
        let manager = ClusterModelManager::new("Technology", MemoryStore::default());
        let model = manager.fit(None, &blobs(), Utc::now()).unwrap();
        let (_, assignment) = manager.predict(Some(model), &blobs()).unwrap();

        let label = |s: &str| assignment.label(&Symbol::from(s)).unwrap();
        assert_eq!(label("A"), label("B"));
        assert_eq!(label("E"), label("L"));
        assert_eq!(label("H"), label("K"));
    }

    #[test]
    fn single_row_fits_one_cluster() {
        let manager = ClusterModelManager::new("Tech", MemoryStore::default());
        let single: FeatureMatrix =
            [(Symbol::from("ONLY"), RiskFeatures::new(0.1, 0.2, 1.0))].into_iter().collect();
        let model = manager.fit_fresh(&single, Utc::now()).unwrap();
        assert_eq!(model.k(), 1);
    }
}
