//! Flat-file record store for uavdex.
//!
//! Each collection is persisted as one pretty-printed JSON array-of-objects
//! file, rewritten whole on every change. A missing backing file reads as an
//! empty collection. There is no locking and no partial-write protection;
//! concurrent writers are last-write-wins at the file level.

pub mod cases;
pub mod params;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{AircraftModel, Subsystem};

/// Load a collection from its backing file.
///
/// A missing file is an empty collection, not an error.
pub(crate) fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!("No backing file at {}, treating as empty", path.display());
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| Error::CollectionRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::CollectionParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist a collection to its backing file, rewriting it whole.
///
/// Creates parent directories as needed. The output is pretty-printed UTF-8
/// so the files stay human-diffable.
pub(crate) fn save_collection<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).map_err(|source| Error::CollectionWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// The aircraft and subsystem collections.
///
/// Records are matched by name (the de-facto unique key); identifiers are
/// opaque and never used for matching.
#[derive(Debug, Clone)]
pub struct Catalog {
    aircraft_path: PathBuf,
    subsystems_path: PathBuf,
}

impl Catalog {
    /// Create a catalog rooted at the configured data directory.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            aircraft_path: config.aircraft_path(),
            subsystems_path: config.subsystems_path(),
        }
    }

    /// Create a catalog over explicit backing files.
    #[must_use]
    pub fn from_paths(aircraft_path: PathBuf, subsystems_path: PathBuf) -> Self {
        Self {
            aircraft_path,
            subsystems_path,
        }
    }

    /// Path of the aircraft backing file.
    #[must_use]
    pub fn aircraft_path(&self) -> &Path {
        &self.aircraft_path
    }

    /// Path of the subsystem backing file.
    #[must_use]
    pub fn subsystems_path(&self) -> &Path {
        &self.subsystems_path
    }

    /// Load the aircraft collection in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read or parsed.
    pub fn aircraft(&self) -> Result<Vec<AircraftModel>> {
        load_collection(&self.aircraft_path)
    }

    /// Persist the aircraft collection, rewriting the whole file.
    ///
    /// NaN values are normalized to `null` before serialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_aircraft(&self, records: &[AircraftModel]) -> Result<()> {
        let mut normalized = records.to_vec();
        for record in &mut normalized {
            record.normalize();
        }
        save_collection(&self.aircraft_path, &normalized)
    }

    /// Look up an aircraft by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read or parsed.
    pub fn find_aircraft(&self, name: &str) -> Result<Option<AircraftModel>> {
        Ok(self.aircraft()?.into_iter().find(|m| m.name == name))
    }

    /// Add a new aircraft record.
    ///
    /// Assigns a fresh identifier when the record carries none. Returns the
    /// stored record.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name/manufacturer or negative
    /// attribute, and a duplicate-name error when the name is already taken.
    pub fn add_aircraft(&self, mut model: AircraftModel) -> Result<AircraftModel> {
        model.validate()?;

        let mut records = self.aircraft()?;
        if records.iter().any(|m| m.name == model.name) {
            return Err(Error::duplicate("aircraft", model.name));
        }

        if model.id.is_empty() {
            model.id = AircraftModel::new_id();
        }
        records.push(model.clone());
        self.save_aircraft(&records)?;
        info!("Added aircraft '{}'", model.name);
        Ok(model)
    }

    /// Replace the aircraft record matched by `name` with `model`.
    ///
    /// The stored identifier is kept when the replacement carries none.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no record matches, a validation error
    /// for an invalid replacement, and a duplicate-name error when renaming
    /// onto an existing record.
    pub fn update_aircraft(&self, name: &str, mut model: AircraftModel) -> Result<AircraftModel> {
        model.validate()?;

        let mut records = self.aircraft()?;
        let index = records
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| Error::not_found("aircraft", name))?;

        if model.name != name && records.iter().any(|m| m.name == model.name) {
            return Err(Error::duplicate("aircraft", model.name));
        }

        if model.id.is_empty() {
            model.id.clone_from(&records[index].id);
        }
        records[index] = model.clone();
        self.save_aircraft(&records)?;
        info!("Updated aircraft '{}'", model.name);
        Ok(model)
    }

    /// Remove the aircraft record matched by `name`.
    ///
    /// Returns `true` if a record was removed, `false` if none matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read or written.
    pub fn remove_aircraft(&self, name: &str) -> Result<bool> {
        let mut records = self.aircraft()?;
        let before = records.len();
        records.retain(|m| m.name != name);
        if records.len() == before {
            return Ok(false);
        }
        self.save_aircraft(&records)?;
        info!("Removed aircraft '{name}'");
        Ok(true)
    }

    /// Load the subsystem collection in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read or parsed.
    pub fn subsystems(&self) -> Result<Vec<Subsystem>> {
        load_collection(&self.subsystems_path)
    }

    /// Persist the subsystem collection, rewriting the whole file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_subsystems(&self, records: &[Subsystem]) -> Result<()> {
        save_collection(&self.subsystems_path, records)
    }

    /// Look up a subsystem by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read or parsed.
    pub fn find_subsystem(&self, name: &str) -> Result<Option<Subsystem>> {
        Ok(self.subsystems()?.into_iter().find(|s| s.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn test_catalog(tag: &str) -> (Catalog, PathBuf) {
        let dir = std::env::temp_dir().join(format!("uavdex_store_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let catalog = Catalog::from_paths(dir.join("uav_models.json"), dir.join("subsystems.json"));
        (catalog, dir)
    }

    fn sample_aircraft(name: &str) -> AircraftModel {
        AircraftModel {
            name: name.to_string(),
            manufacturer: "ACME".to_string(),
            category: Category::FixedWing,
            mtow_kg: Some(25.0),
            ..AircraftModel::default()
        }
    }

    #[test]
    fn test_missing_file_is_empty_collection() {
        let (catalog, dir) = test_catalog("missing");
        assert!(catalog.aircraft().unwrap().is_empty());
        assert!(catalog.subsystems().unwrap().is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_add_then_load() {
        let (catalog, dir) = test_catalog("add");

        let stored = catalog.add_aircraft(sample_aircraft("Heron")).unwrap();
        assert!(stored.id.starts_with("uav-"));

        let records = catalog.aircraft().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Heron");
        assert_eq!(records[0].mtow_kg, Some(25.0));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_add_grows_by_exactly_one() {
        let (catalog, dir) = test_catalog("grow");

        catalog.add_aircraft(sample_aircraft("A")).unwrap();
        let before = catalog.aircraft().unwrap().len();
        catalog.add_aircraft(sample_aircraft("B")).unwrap();
        assert_eq!(catalog.aircraft().unwrap().len(), before + 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_add_duplicate_name_rejected() {
        let (catalog, dir) = test_catalog("dup");

        catalog.add_aircraft(sample_aircraft("Heron")).unwrap();
        let err = catalog.add_aircraft(sample_aircraft("Heron")).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
        assert_eq!(catalog.aircraft().unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_add_invalid_record_writes_nothing() {
        let (catalog, dir) = test_catalog("invalid");

        let invalid = AircraftModel::default();
        assert!(catalog.add_aircraft(invalid).is_err());
        assert!(!catalog.aircraft_path().exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let (catalog, dir) = test_catalog("update");

        catalog.add_aircraft(sample_aircraft("A")).unwrap();
        let original = catalog.add_aircraft(sample_aircraft("B")).unwrap();

        let mut replacement = sample_aircraft("B");
        replacement.mtow_kg = Some(30.0);
        let stored = catalog.update_aircraft("B", replacement).unwrap();

        // Identifier survives the replacement
        assert_eq!(stored.id, original.id);

        let records = catalog.aircraft().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "B");
        assert_eq!(records[1].mtow_kg, Some(30.0));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_update_missing_record() {
        let (catalog, dir) = test_catalog("update_missing");

        let err = catalog
            .update_aircraft("Ghost", sample_aircraft("Ghost"))
            .unwrap_err();
        assert!(err.is_not_found());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_update_rename_onto_existing_rejected() {
        let (catalog, dir) = test_catalog("rename");

        catalog.add_aircraft(sample_aircraft("A")).unwrap();
        catalog.add_aircraft(sample_aircraft("B")).unwrap();

        let err = catalog
            .update_aircraft("A", sample_aircraft("B"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_remove_aircraft() {
        let (catalog, dir) = test_catalog("remove");

        catalog.add_aircraft(sample_aircraft("Heron")).unwrap();
        assert!(catalog.remove_aircraft("Heron").unwrap());
        assert!(!catalog.remove_aircraft("Heron").unwrap());
        assert!(catalog.aircraft().unwrap().is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_find_aircraft() {
        let (catalog, dir) = test_catalog("find");

        catalog.add_aircraft(sample_aircraft("Heron")).unwrap();
        assert!(catalog.find_aircraft("Heron").unwrap().is_some());
        assert!(catalog.find_aircraft("Ghost").unwrap().is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_nan_saved_as_null() {
        let (catalog, dir) = test_catalog("nan");

        let mut model = sample_aircraft("Heron");
        model.range_km = Some(f64::NAN);
        catalog.save_aircraft(&[model]).unwrap();

        let raw = std::fs::read_to_string(catalog.aircraft_path()).unwrap();
        assert!(raw.contains("\"range_km\": null"));

        let records = catalog.aircraft().unwrap();
        assert_eq!(records[0].range_km, None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_round_trip_preserves_nulls() {
        let (catalog, dir) = test_catalog("roundtrip");

        let model = sample_aircraft("Heron"); // every other attribute unset
        catalog.save_aircraft(std::slice::from_ref(&model)).unwrap();
        let records = catalog.aircraft().unwrap();
        assert_eq!(records, vec![model]);

        let raw = std::fs::read_to_string(catalog.aircraft_path()).unwrap();
        assert!(raw.contains("\"wingspan_m\": null"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_is_pretty_printed() {
        let (catalog, dir) = test_catalog("pretty");

        catalog.add_aircraft(sample_aircraft("Heron")).unwrap();
        let raw = std::fs::read_to_string(catalog.aircraft_path()).unwrap();
        assert!(raw.contains('\n'));
        assert!(raw.trim_start().starts_with('['));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let (catalog, dir) = test_catalog("corrupt");

        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(catalog.aircraft_path(), "{ not json").unwrap();

        let err = catalog.aircraft().unwrap_err();
        assert!(matches!(err, Error::CollectionParse { .. }));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_subsystems_round_trip() {
        let (catalog, dir) = test_catalog("subsystems");

        let subsystem = Subsystem {
            name: "Pixhawk 6C".to_string(),
            manufacturer: "Holybro".to_string(),
            category: "Flight Controller".to_string(),
            ..Subsystem::default()
        };
        catalog
            .save_subsystems(std::slice::from_ref(&subsystem))
            .unwrap();

        assert_eq!(catalog.subsystems().unwrap(), vec![subsystem]);
        assert!(catalog.find_subsystem("Pixhawk 6C").unwrap().is_some());
        assert!(catalog.find_subsystem("Ghost").unwrap().is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!(
            "uavdex_store_nested_{}/deeper/still",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let catalog = Catalog::from_paths(dir.join("uav_models.json"), dir.join("subsystems.json"));

        catalog.save_aircraft(&[]).unwrap();
        assert!(catalog.aircraft_path().exists());

        let _ = std::fs::remove_dir_all(dir);
    }
}
