//! Cluster model persistence trait definitions.

use chrono::{DateTime, Utc};
use riskpeers_primitives::{ClusterModel, SectorKey};

/// Errors that can occur while persisting or loading models.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored model belongs to another sector.
    #[error("stored model is for sector {found}, expected {expected}")]
    SectorMismatch {
        /// Requested sector key.
        expected: SectorKey,
        /// Sector key recorded in the stored model.
        found: SectorKey,
    },
}

/// Sector-keyed storage for fitted cluster models.
pub trait ModelStore {
    /// Persist `model` under `key`, replacing any previous model.
    ///
    /// # Errors
    /// Returns `StoreError` if the model cannot be written.
    fn save(&self, model: &ClusterModel, key: &SectorKey) -> Result<(), StoreError>;

    /// Load the model stored under `key`, if any.
    ///
    /// # Errors
    /// Returns `StoreError` if a stored model exists but cannot be read.
    fn load(&self, key: &SectorKey) -> Result<Option<ClusterModel>, StoreError>;

    /// Whether the model under `key` is missing or older than the most
    /// recent completed trading session as of `now`.
    ///
    /// # Errors
    /// Returns `StoreError` if the storage metadata cannot be read.
    fn is_stale(&self, key: &SectorKey, now: DateTime<Utc>) -> Result<bool, StoreError>;
}

impl<T: ModelStore + ?Sized> ModelStore for &T {
    fn save(&self, model: &ClusterModel, key: &SectorKey) -> Result<(), StoreError> {
        (**self).save(model, key)
    }

    fn load(&self, key: &SectorKey) -> Result<Option<ClusterModel>, StoreError> {
        (**self).load(key)
    }

    fn is_stale(&self, key: &SectorKey, now: DateTime<Utc>) -> Result<bool, StoreError> {
        (**self).is_stale(key, now)
    }
}
