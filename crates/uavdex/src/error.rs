//! Error types for uavdex.
//!
//! This module defines all error types used throughout the uavdex crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for uavdex operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// Failed to read a collection's backing file.
    #[error("failed to read collection at {path}: {source}")]
    CollectionRead {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A collection's backing file holds invalid JSON.
    #[error("failed to parse collection at {path}: {source}")]
    CollectionParse {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write a collection's backing file.
    #[error("failed to write collection at {path}: {source}")]
    CollectionWrite {
        /// Path to the backing file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A requested record does not exist.
    #[error("no record named '{name}' in {collection}")]
    RecordNotFound {
        /// The collection that was searched.
        collection: &'static str,
        /// The name that was looked up.
        name: String,
    },

    /// A record with the same natural key already exists.
    #[error("a record named '{name}' already exists in {collection}")]
    DuplicateName {
        /// The collection holding the duplicate.
        collection: &'static str,
        /// The conflicting name.
        name: String,
    },

    // === Validation Errors ===
    /// A record failed validation.
    #[error("invalid record: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// A category value is outside the fixed enumeration.
    #[error("unknown aircraft category: '{value}'")]
    UnknownCategory {
        /// The rejected value.
        value: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Import Errors ===
    /// Reading a sheet file failed.
    #[error("failed to read sheet {path}: {message}")]
    SheetRead {
        /// Path to the sheet file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// An import run failed; no collection was modified.
    #[error("import failed: {message}")]
    Import {
        /// Description of what went wrong.
        message: String,
    },

    // === Statistics Errors ===
    /// No rows survive the positive-value filter.
    #[error("no usable data: every row has a non-positive or missing value for '{x}' or '{y}'")]
    NoUsableData {
        /// The selected x attribute.
        x: String,
        /// The selected y attribute.
        y: String,
    },

    /// A selected attribute is not part of the schema.
    #[error("unknown attribute: '{name}'")]
    UnknownAttribute {
        /// The rejected attribute name.
        name: String,
    },

    /// Model fitting failed.
    #[error("model fit failed: {message}")]
    Fit {
        /// Description of what went wrong.
        message: String,
    },

    // === Extraction Errors ===
    /// The extraction request could not be sent.
    #[error("extraction request failed: {message}")]
    ExtractRequest {
        /// Description of what went wrong.
        message: String,
    },

    /// The extraction service answered with an error status.
    #[error("extraction service error (HTTP {status}): {message}")]
    ExtractStatus {
        /// The HTTP status code.
        status: u16,
        /// The service's own error message, or the status text.
        message: String,
    },

    /// The completion text did not contain a parseable JSON object.
    #[error("could not parse a JSON object from the completion: {content}")]
    ExtractParse {
        /// The verbatim completion content.
        content: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for uavdex operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new import error.
    #[must_use]
    pub fn import(message: impl Into<String>) -> Self {
        Self::Import {
            message: message.into(),
        }
    }

    /// Create a new fit error.
    #[must_use]
    pub fn fit(message: impl Into<String>) -> Self {
        Self::Fit {
            message: message.into(),
        }
    }

    /// Create a duplicate-name error for the given collection.
    #[must_use]
    pub fn duplicate(collection: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            collection,
            name: name.into(),
        }
    }

    /// Create a record-not-found error for the given collection.
    #[must_use]
    pub fn not_found(collection: &'static str, name: impl Into<String>) -> Self {
        Self::RecordNotFound {
            collection,
            name: name.into(),
        }
    }

    /// Check if this error means a record was not found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. })
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::UnknownCategory { .. } | Self::DuplicateName { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::validation("name is required");
        assert_eq!(err.to_string(), "invalid record: name is required");

        let err = Error::fit("singular matrix");
        assert_eq!(err.to_string(), "model fit failed: singular matrix");
    }

    #[test]
    fn test_duplicate_name_display() {
        let err = Error::duplicate("aircraft", "Predator");
        let msg = err.to_string();
        assert!(msg.contains("Predator"));
        assert!(msg.contains("aircraft"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::not_found("cases", "missing").is_not_found());
        assert!(!Error::validation("x").is_not_found());
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::validation("bad").is_validation());
        assert!(Error::duplicate("aircraft", "X").is_validation());
        assert!(Error::UnknownCategory {
            value: "Blimp".to_string()
        }
        .is_validation());
        assert!(!Error::not_found("aircraft", "X").is_validation());
    }

    #[test]
    fn test_unknown_category_display() {
        let err = Error::UnknownCategory {
            value: "Blimp".to_string(),
        };
        assert!(err.to_string().contains("Blimp"));
    }

    #[test]
    fn test_no_usable_data_display() {
        let err = Error::NoUsableData {
            x: "mtow_kg".to_string(),
            y: "range_km".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("mtow_kg"));
        assert!(msg.contains("range_km"));
    }

    #[test]
    fn test_extract_status_display() {
        let err = Error::ExtractStatus {
            status: 401,
            message: "invalid api key".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid api key"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_collection_parse_display() {
        let bad: std::result::Result<Vec<i32>, _> = serde_json::from_str("{");
        if let Err(source) = bad {
            let err = Error::CollectionParse {
                path: PathBuf::from("/data/uav_models.json"),
                source,
            };
            assert!(err.to_string().contains("/data/uav_models.json"));
        }
    }

    #[test]
    fn test_directory_create_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
