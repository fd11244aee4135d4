//! Ticker symbol and sector key definitions.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Stock ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a new symbol.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Create a symbol following the data provider's ticker convention.
    ///
    /// Upper-cases the input and replaces share-class dots with dashes,
    /// so `brk.b` becomes `BRK-B`.
    #[must_use]
    pub fn normalized(s: &str) -> Self {
        Self(s.trim().to_uppercase().replace('.', "-"))
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Storage key derived from a sector name.
///
/// Lower-cased with spaces replaced by underscores, so that
/// `"Information Technology"` maps to `information_technology`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorKey(String);

impl SectorKey {
    /// Suffix appended to the key to form the persisted model file name.
    pub const MODEL_SUFFIX: &'static str = "_cluster_model.json";

    /// Derive the key for a sector name.
    #[must_use]
    pub fn new(sector: &str) -> Self {
        Self(sector.trim().to_lowercase().replace(' ', "_"))
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the persisted cluster model for this sector.
    #[must_use]
    pub fn model_file_name(&self) -> String {
        format!("{}{}", self.0, Self::MODEL_SUFFIX)
    }
}
