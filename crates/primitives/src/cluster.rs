//! Cluster model and cluster assignment definitions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FeatureMatrix, N_FEATURES, PrimitiveError, SectorKey, Symbol};

/// A fitted centroid partition of risk-feature space for one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    /// Sector the model was fit for.
    pub sector: SectorKey,
    /// Cluster centers, one per label.
    pub centroids: Vec<[f64; N_FEATURES]>,
    /// Sum of squared distances from the training rows to their centroids.
    pub inertia: f64,
    /// Fit timestamp.
    pub fitted_at: DateTime<Utc>,
}

impl ClusterModel {
    /// Create a new cluster model.
    #[must_use]
    pub const fn new(
        sector: SectorKey,
        centroids: Vec<[f64; N_FEATURES]>,
        inertia: f64,
        fitted_at: DateTime<Utc>,
    ) -> Self {
        Self { sector, centroids, inertia, fitted_at }
    }

    /// Number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Label of the centroid nearest to `point`. Ties go to the lower label.
    #[must_use]
    pub fn nearest_centroid(&self, point: &[f64; N_FEATURES]) -> usize {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (label, centroid) in self.centroids.iter().enumerate() {
            let dist: f64 = centroid.iter().zip(point).map(|(c, p)| (c - p).powi(2)).sum();
            if dist < best_dist {
                best = label;
                best_dist = dist;
            }
        }
        best
    }

    /// Assign every row of `matrix` to its nearest centroid.
    #[must_use]
    pub fn assign(&self, matrix: &FeatureMatrix) -> ClusterAssignment {
        let labels = matrix.rows().iter().map(|f| self.nearest_centroid(&f.to_array())).collect();
        ClusterAssignment::from_parts(matrix.symbols().to_vec(), labels)
    }
}

/// Cluster label per ticker, in the row order of the source matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterAssignment {
    symbols: Vec<Symbol>,
    labels: Vec<usize>,
    index: HashMap<Symbol, usize>,
}

impl ClusterAssignment {
    /// Create an assignment for the rows of `matrix`.
    ///
    /// # Errors
    /// Returns an error if the number of labels does not match the rows.
    pub fn from_labels(matrix: &FeatureMatrix, labels: Vec<usize>) -> Result<Self, PrimitiveError> {
        if labels.len() != matrix.len() {
            return Err(PrimitiveError::LengthMismatch {
                expected: matrix.len(),
                actual: labels.len(),
            });
        }
        Ok(Self::from_parts(matrix.symbols().to_vec(), labels))
    }

    fn from_parts(symbols: Vec<Symbol>, labels: Vec<usize>) -> Self {
        let index = symbols.iter().enumerate().map(|(i, s)| (s.clone(), i)).collect();
        Self { symbols, labels, index }
    }

    /// Number of assigned tickers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of a specific symbol.
    #[must_use]
    pub fn label(&self, symbol: &Symbol) -> Option<usize> {
        self.index.get(symbol).map(|&i| self.labels[i])
    }

    /// Iterate over `(symbol, label)` pairs in row order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, usize)> {
        self.symbols.iter().zip(self.labels.iter().copied())
    }

    /// Symbols carrying `label`, in row order.
    pub fn members(&self, label: usize) -> impl Iterator<Item = &Symbol> {
        self.iter().filter(move |(_, l)| *l == label).map(|(s, _)| s)
    }

    /// Check that this assignment covers exactly the tickers of `matrix`.
    ///
    /// # Errors
    /// Returns an error naming the first ticker present on one side only.
    pub fn check_matches(&self, matrix: &FeatureMatrix) -> Result<(), PrimitiveError> {
        if let Some(s) = self.symbols.iter().find(|s| !matrix.contains(s)) {
            return Err(PrimitiveError::UnmatchedSymbol(s.clone()));
        }
        if let Some(s) = matrix.symbols().iter().find(|s| !self.index.contains_key(*s)) {
            return Err(PrimitiveError::UnmatchedSymbol(s.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::RiskFeatures;

    fn matrix() -> FeatureMatrix {
        [
            ("A", RiskFeatures::new(0.10, 0.20, 1.0)),
            ("B", RiskFeatures::new(0.11, 0.21, 1.05)),
            ("C", RiskFeatures::new(0.80, 0.90, 2.5)),
        ]
        .into_iter()
        .map(|(s, f)| (Symbol::from(s), f))
        .collect()
    }

    fn model() -> ClusterModel {
        ClusterModel::new(
            SectorKey::new("Technology"),
            vec![[0.105, 0.205, 1.025], [0.80, 0.90, 2.5]],
            0.0,
            Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap(),
        )
    }

    #[test]
    fn assign_nearest_centroid() {
        let assignment = model().assign(&matrix());
        assert_eq!(assignment.label(&"A".into()), Some(0));
        assert_eq!(assignment.label(&"B".into()), Some(0));
        assert_eq!(assignment.label(&"C".into()), Some(1));
        assert_eq!(assignment.members(0).count(), 2);
    }

    #[test]
    fn assignment_matches_matrix() {
        let m = matrix();
        let assignment = model().assign(&m);
        assert!(assignment.check_matches(&m).is_ok());

        let mut bigger = m;
        bigger.insert("D".into(), RiskFeatures::new(0.0, 0.0, 0.0)).unwrap();
        assert!(matches!(
            assignment.check_matches(&bigger),
            Err(PrimitiveError::UnmatchedSymbol(s)) if s.as_str() == "D"
        ));
    }

    #[test]
    fn from_labels_length_mismatch() {
        let err = ClusterAssignment::from_labels(&matrix(), vec![0, 1]).unwrap_err();
        assert!(matches!(err, PrimitiveError::LengthMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn model_serde_round_trip() {
        let original = model();
        let json = serde_json::to_string(&original).unwrap();
        let restored: ClusterModel = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.k(), 2);
    }
}
