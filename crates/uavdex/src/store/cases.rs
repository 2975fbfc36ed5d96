//! Case document store.
//!
//! Design write-ups are kept as individual Markdown files in the cases
//! directory, one `<name>.md` per document. The entry name is the file stem;
//! there is no structured metadata.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};

/// A listed case document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseEntry {
    /// Entry name (file stem, without the `.md` extension).
    pub name: String,
    /// Full path of the backing file.
    pub path: PathBuf,
}

/// Directory of free-text case documents.
#[derive(Debug, Clone)]
pub struct CaseStore {
    dir: PathBuf,
}

impl CaseStore {
    /// Create a store at the configured cases directory.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.cases_dir(),
        }
    }

    /// Create a store over an explicit directory.
    #[must_use]
    pub fn from_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The cases directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List all case documents, sorted by name.
    ///
    /// Only `.md` files count; a missing directory is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn list(&self) -> Result<Vec<CaseEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    entries.push(CaseEntry {
                        name: stem.to_string(),
                        path: path.clone(),
                    });
                }
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Read a case document's content by name.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no document with that name exists.
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(Error::not_found("cases", name));
        }
        Ok(std::fs::read_to_string(path)?)
    }

    /// Save a case document, overwriting silently.
    ///
    /// The `.md` extension is appended when missing; the cases directory is
    /// created on demand. Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or an I/O error when the
    /// write fails.
    pub fn save(&self, name: &str, content: &str) -> Result<PathBuf> {
        if name.trim().is_empty() {
            return Err(Error::validation("case name is required"));
        }

        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).map_err(|source| Error::DirectoryCreate {
                path: self.dir.clone(),
                source,
            })?;
        }

        let path = self.path_for(name);
        std::fs::write(&path, content)?;
        info!("Saved case '{}'", name.trim_end_matches(".md"));
        Ok(path)
    }

    /// Remove a case document by name.
    ///
    /// Idempotent: returns `true` when a file was removed, `false` when no
    /// document with that name existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        info!("Removed case '{}'", name.trim_end_matches(".md"));
        Ok(true)
    }

    /// Resolve a name (with or without the `.md` extension) to a path.
    fn path_for(&self, name: &str) -> PathBuf {
        if name.ends_with(".md") {
            self.dir.join(name)
        } else {
            self.dir.join(format!("{name}.md"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(tag: &str) -> (CaseStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("uavdex_cases_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        (CaseStore::from_dir(dir.clone()), dir)
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let (store, dir) = test_store("missing");
        assert!(store.list().unwrap().is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_appends_extension() {
        let (store, dir) = test_store("ext");

        let path = store.save("DJI_Mavic_3", "# Mavic 3\n").unwrap();
        assert!(path.to_string_lossy().ends_with("DJI_Mavic_3.md"));

        // Passing the extension explicitly hits the same file
        let same = store.save("DJI_Mavic_3.md", "# Updated\n").unwrap();
        assert_eq!(path, same);
        assert_eq!(store.read("DJI_Mavic_3").unwrap(), "# Updated\n");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_list_sorted_md_only() {
        let (store, dir) = test_store("list");

        store.save("Zephyr", "z").unwrap();
        store.save("Anka", "a").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let entries = store.list().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Anka", "Zephyr"]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (store, dir) = test_store("read_missing");
        assert!(store.read("Ghost").unwrap_err().is_not_found());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, dir) = test_store("remove");

        store.save("Heron", "# Heron\n").unwrap();
        assert!(store.remove("Heron").unwrap());
        assert!(!store.remove("Heron").unwrap());
        assert!(store.list().unwrap().is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_blank_name_rejected() {
        let (store, dir) = test_store("blank");
        assert!(store.save("  ", "content").unwrap_err().is_validation());
        let _ = std::fs::remove_dir_all(dir);
    }
}
