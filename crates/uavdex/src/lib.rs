//! `uavdex` - A flat-file UAV specification catalogue
//!
//! This library provides the core functionality for cataloguing UAV models,
//! subsystems, and design cases, with tabular import reconciliation,
//! regression statistics, and AI-assisted record extraction.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod assets;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod import;
pub mod logging;
pub mod model;
pub mod stats;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{AircraftModel, Category, ParamDef, Subsystem};
pub use store::Catalog;
