//! Filesystem store for fitted cluster models.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use riskpeers_primitives::{ClusterModel, SectorKey};
use riskpeers_traits::{ModelStore, StoreError};

use crate::MarketCalendar;

/// Stores one pretty-printed JSON model per sector under a directory.
///
/// The file for a sector is `<dir>/<sector_key>_cluster_model.json`.
#[derive(Debug, Clone)]
pub struct JsonModelStore {
    dir: PathBuf,
    calendar: MarketCalendar,
}

impl JsonModelStore {
    /// Create a store rooted at `dir` using the default market calendar.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_calendar(dir, MarketCalendar::default())
    }

    /// Create a store with a custom calendar.
    #[must_use]
    pub fn with_calendar(dir: impl Into<PathBuf>, calendar: MarketCalendar) -> Self {
        Self { dir: dir.into(), calendar }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the model file for `key`.
    #[must_use]
    pub fn path(&self, key: &SectorKey) -> PathBuf {
        self.dir.join(key.model_file_name())
    }
}

impl ModelStore for JsonModelStore {
    fn save(&self, model: &ClusterModel, key: &SectorKey) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(model)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let path = self.path(key);
        fs::write(&path, json)?;
        tracing::info!(sector = %key, k = model.k(), path = %path.display(), "saved cluster model");
        Ok(())
    }

    fn load(&self, key: &SectorKey) -> Result<Option<ClusterModel>, StoreError> {
        let path = self.path(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let model: ClusterModel =
            serde_json::from_str(&json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        if &model.sector != key {
            return Err(StoreError::SectorMismatch { expected: key.clone(), found: model.sector });
        }
        tracing::debug!(sector = %key, k = model.k(), "loaded cluster model");
        Ok(Some(model))
    }

    fn is_stale(&self, key: &SectorKey, now: DateTime<Utc>) -> Result<bool, StoreError> {
        match fs::metadata(self.path(key)) {
            Ok(meta) => {
                let modified: DateTime<Utc> = meta.modified()?.into();
                Ok(self.calendar.is_stale(modified, now))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn model(sector: &str) -> ClusterModel {
        ClusterModel::new(
            SectorKey::new(sector),
            vec![[0.1, 0.2, 1.0], [0.8, 0.9, 2.5]],
            0.0125,
            Utc::now(),
        )
    }

    #[test]
    fn load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path());
        assert!(store.load(&SectorKey::new("Energy")).unwrap().is_none());
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path().join("models"));
        let key = SectorKey::new("Consumer Defensive");
        let original = model("Consumer Defensive");

        store.save(&original, &key).unwrap();
        assert!(store.path(&key).ends_with("consumer_defensive_cluster_model.json"));

        let loaded = store.load(&key).unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn load_rejects_foreign_sector() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path());
        let key = SectorKey::new("Energy");
        fs::write(store.path(&key), serde_json::to_string(&model("Utilities")).unwrap()).unwrap();

        assert!(matches!(store.load(&key), Err(StoreError::SectorMismatch { .. })));
    }

    #[test]
    fn load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path());
        let key = SectorKey::new("Energy");
        fs::write(store.path(&key), "{not json").unwrap();

        assert!(matches!(store.load(&key), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn staleness_follows_file_age() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path());
        let key = SectorKey::new("Energy");
        let now = Utc::now();

        assert!(store.is_stale(&key, now).unwrap());

        store.save(&model("Energy"), &key).unwrap();
        assert!(!store.is_stale(&key, now).unwrap());
        assert!(store.is_stale(&key, now + TimeDelta::days(7)).unwrap());
    }
}
