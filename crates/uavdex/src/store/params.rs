//! Custom-parameter registry.
//!
//! A small keyed list of user-defined numeric attributes (name and unit)
//! extending the fixed aircraft schema. Definitions are created and deleted,
//! never updated; deleting one does not touch values already stored on
//! aircraft records.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::ParamDef;

use super::{load_collection, save_collection};

/// Registry of custom-parameter definitions, backed by one JSON file.
#[derive(Debug, Clone)]
pub struct ParamRegistry {
    path: PathBuf,
}

impl ParamRegistry {
    /// Create a registry at the configured location.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.params_path(),
        }
    }

    /// Create a registry over an explicit backing file.
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List definitions in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read or parsed.
    pub fn list(&self) -> Result<Vec<ParamDef>> {
        load_collection(&self.path)
    }

    /// Look up a definition by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read or parsed.
    pub fn find(&self, name: &str) -> Result<Option<ParamDef>> {
        Ok(self.list()?.into_iter().find(|p| p.name == name))
    }

    /// Add a definition.
    ///
    /// Uniqueness is enforced on the name only, with a case-sensitive exact
    /// match.
    ///
    /// # Errors
    ///
    /// Returns a duplicate-name error when a definition with the same name
    /// exists, or a validation error for a blank name.
    pub fn add(&self, name: &str, unit: &str) -> Result<ParamDef> {
        if name.trim().is_empty() {
            return Err(Error::validation("parameter name is required"));
        }

        let mut params = self.list()?;
        if params.iter().any(|p| p.name == name) {
            return Err(Error::duplicate("custom parameters", name));
        }

        let def = ParamDef::new(name, unit);
        params.push(def.clone());
        save_collection(&self.path, &params)?;
        info!("Added custom parameter '{name}'");
        Ok(def)
    }

    /// Remove a definition by name.
    ///
    /// Idempotent: removing an absent name is not an error. Returns `true`
    /// when a definition was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read or written.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut params = self.list()?;
        let before = params.len();
        params.retain(|p| p.name != name);
        let removed = params.len() != before;
        save_collection(&self.path, &params)?;
        if removed {
            info!("Removed custom parameter '{name}'");
        }
        Ok(removed)
    }
}
