//! Image reference resolution.
//!
//! A record's image reference is either an absolute network URL (used as-is)
//! or a local file name resolved by probing a fixed ordered list of base
//! directories; the first existing match wins.

use std::path::{Path, PathBuf};

use crate::config::Config;

/// A resolved image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// A network URL, passed through untouched.
    Url(String),
    /// An existing local file.
    File(PathBuf),
}

/// Resolve an image reference against the configured directories.
///
/// Probes, in order: the assets directory, the data directory, and the
/// reference itself when it is an absolute path. Returns `None` for a blank
/// reference or when no candidate exists.
#[must_use]
pub fn resolve(reference: &str, config: &Config) -> Option<ImageRef> {
    resolve_in(reference, &[config.assets_dir(), config.data_dir()])
}

/// Resolve an image reference against explicit base directories.
#[must_use]
pub fn resolve_in(reference: &str, base_dirs: &[PathBuf]) -> Option<ImageRef> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Some(ImageRef::Url(reference.to_string()));
    }

    for base in base_dirs {
        let candidate = base.join(reference);
        if candidate.exists() {
            return Some(ImageRef::File(candidate));
        }
    }

    let as_path = Path::new(reference);
    if as_path.is_absolute() && as_path.exists() {
        return Some(ImageRef::File(as_path.to_path_buf()));
    }

    None
}
