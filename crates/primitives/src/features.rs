//! Risk feature vector and feature matrix definitions.

use std::collections::HashMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{PrimitiveError, Symbol};

/// Number of dimensions in a risk feature vector.
pub const N_FEATURES: usize = 3;

/// Names of the risk features in column order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = ["annual_return", "volatility", "beta"];

/// Largest feature magnitude accepted for clustering. Squared distances
/// between features beyond this bound overflow `f64`.
pub const MAX_FEATURE_MAGNITUDE: f64 = 1e150;

/// Risk profile of a single ticker.
///
/// `beta` is `NaN` when the benchmark has zero variance over the aligned
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFeatures {
    /// Geometric-compounded annualized return.
    pub annual_return: f64,
    /// Annualized standard deviation of log returns.
    pub volatility: f64,
    /// Sensitivity to the benchmark's log returns.
    pub beta: f64,
}

impl RiskFeatures {
    /// Create a new feature vector.
    #[must_use]
    pub const fn new(annual_return: f64, volatility: f64, beta: f64) -> Self {
        Self { annual_return, volatility, beta }
    }

    /// Features as an array in [`FEATURE_NAMES`] order.
    #[must_use]
    pub const fn to_array(&self) -> [f64; N_FEATURES] {
        [self.annual_return, self.volatility, self.beta]
    }

    /// Whether every feature is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// Whether every feature is finite and within [`MAX_FEATURE_MAGNITUDE`].
    #[must_use]
    pub fn is_clusterable(&self) -> bool {
        self.to_array().iter().all(|v| v.abs() <= MAX_FEATURE_MAGNITUDE)
    }
}

impl From<[f64; N_FEATURES]> for RiskFeatures {
    fn from(v: [f64; N_FEATURES]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Risk features for every ticker in a sector, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    symbols: Vec<Symbol>,
    rows: Vec<RiskFeatures>,
    index: HashMap<Symbol, usize>,
}

impl FeatureMatrix {
    /// Create an empty matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row.
    ///
    /// # Errors
    /// Returns an error if the symbol is already present.
    pub fn insert(&mut self, symbol: Symbol, features: RiskFeatures) -> Result<(), PrimitiveError> {
        if self.index.contains_key(&symbol) {
            return Err(PrimitiveError::DuplicateSymbol(symbol));
        }
        self.index.insert(symbol.clone(), self.rows.len());
        self.symbols.push(symbol);
        self.rows.push(features);
        Ok(())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row symbols in insertion order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Row features in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[RiskFeatures] {
        &self.rows
    }

    /// Whether the matrix has a row for `symbol`.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.index.contains_key(symbol)
    }

    /// Features of a specific symbol.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<&RiskFeatures> {
        self.index.get(symbol).map(|&i| &self.rows[i])
    }

    /// Iterate over `(symbol, features)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &RiskFeatures)> {
        self.symbols.iter().zip(self.rows.iter())
    }

    /// Split into clusterable rows and the symbols dropped.
    ///
    /// See [`RiskFeatures::is_clusterable`].
    #[must_use]
    pub fn partition_clusterable(&self) -> (Self, Vec<Symbol>) {
        let mut kept = Self::new();
        let mut dropped = Vec::new();
        for (symbol, features) in self.iter() {
            if features.is_clusterable() {
                kept.index.insert(symbol.clone(), kept.rows.len());
                kept.symbols.push(symbol.clone());
                kept.rows.push(*features);
            } else {
                dropped.push(symbol.clone());
            }
        }
        (kept, dropped)
    }

    /// Features as an (n_rows x 3) array.
    #[must_use]
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), N_FEATURES), |(i, j)| self.rows[i].to_array()[j])
    }
}

impl FromIterator<(Symbol, RiskFeatures)> for FeatureMatrix {
    /// Later duplicates of a symbol are ignored.
    fn from_iter<I: IntoIterator<Item = (Symbol, RiskFeatures)>>(iter: I) -> Self {
        let mut matrix = Self::new();
        for (symbol, features) in iter {
            let _ = matrix.insert(symbol, features);
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureMatrix {
        let mut m = FeatureMatrix::new();
        m.insert("A".into(), RiskFeatures::new(0.10, 0.20, 1.0)).unwrap();
        m.insert("B".into(), RiskFeatures::new(0.11, 0.21, 1.05)).unwrap();
        m.insert("C".into(), RiskFeatures::new(0.80, 0.90, f64::NAN)).unwrap();
        m
    }

    #[test]
    fn insert_preserves_order() {
        let m = sample();
        let names: Vec<&str> = m.symbols().iter().map(Symbol::as_str).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(m.get(&"B".into()).unwrap().beta, 1.05);
    }

    #[test]
    fn insert_rejects_duplicate() {
        let mut m = sample();
        let err = m.insert("A".into(), RiskFeatures::new(0.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, PrimitiveError::DuplicateSymbol(s) if s.as_str() == "A"));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn to_array_shape() {
        let arr = sample().to_array();
        assert_eq!(arr.dim(), (3, N_FEATURES));
        assert_eq!(arr[[1, 2]], 1.05);
    }

    #[test]
    fn partition_drops_nan_rows() {
        let (kept, dropped) = sample().partition_clusterable();
        assert_eq!(kept.len(), 2);
        assert!(!kept.contains(&"C".into()));
        assert_eq!(dropped, vec![Symbol::from("C")]);
    }

    #[test]
    fn partition_drops_extreme_rows() {
        let mut m = sample();
        m.insert("D".into(), RiskFeatures::new(5e199, 0.0, 1.2)).unwrap();
        m.insert("E".into(), RiskFeatures::new(f64::INFINITY, 0.3, 1.0)).unwrap();
        let (kept, dropped) = m.partition_clusterable();
        let names: Vec<&str> = kept.symbols().iter().map(Symbol::as_str).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(dropped, vec![Symbol::from("C"), Symbol::from("D"), Symbol::from("E")]);
    }

    #[test]
    fn clusterable_bound() {
        assert!(RiskFeatures::new(MAX_FEATURE_MAGNITUDE, -MAX_FEATURE_MAGNITUDE, 0.0).is_clusterable());
        assert!(!RiskFeatures::new(1e200, 0.2, 1.0).is_clusterable());
        assert!(!RiskFeatures::new(0.1, 0.2, f64::NAN).is_clusterable());
        assert!(RiskFeatures::new(1e200, 0.2, 1.0).is_finite());
    }
}
