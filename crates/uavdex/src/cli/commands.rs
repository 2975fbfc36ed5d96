//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::extract::Service;
use crate::stats::ModelKind;

/// Aircraft collection commands.
#[derive(Debug, Subcommand)]
pub enum AircraftCommand {
    /// List catalogued aircraft
    List {
        /// Filter by category (Fixed-Wing, Multi-Rotor, VTOL, Helicopter, Other)
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Filter by manufacturer
        #[arg(short, long)]
        manufacturer: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show one aircraft record
    Show {
        /// The aircraft name
        name: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add an aircraft record from a JSON file
    Add {
        /// Path to a JSON file holding one record
        file: PathBuf,
    },

    /// Replace an aircraft record with one from a JSON file
    Update {
        /// The name of the record to replace
        name: String,

        /// Path to a JSON file holding the replacement record
        file: PathBuf,
    },

    /// Remove an aircraft record
    Remove {
        /// The aircraft name
        name: String,
    },
}

/// Subsystem collection commands.
#[derive(Debug, Subcommand)]
pub enum SubsystemCommand {
    /// List catalogued subsystems
    List {
        /// Filter by category
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show one subsystem record
    Show {
        /// The subsystem name
        name: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Custom-parameter registry commands.
#[derive(Debug, Subcommand)]
pub enum ParamCommand {
    /// List registered parameters
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Register a parameter
    Add {
        /// The parameter name
        name: String,

        /// The display unit
        unit: String,
    },

    /// Remove a parameter definition
    Remove {
        /// The parameter name
        name: String,
    },
}

/// Case document commands.
#[derive(Debug, Subcommand)]
pub enum CaseCommand {
    /// List stored cases
    List,

    /// Print a case's Markdown
    Show {
        /// The case name
        name: String,
    },

    /// Add a case from a Markdown file
    Add {
        /// The case name (stored as `<name>.md`)
        name: String,

        /// Path to the Markdown file
        file: PathBuf,
    },

    /// Remove a case
    Remove {
        /// The case name
        name: String,
    },
}

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// CSV file with aircraft rows
    #[arg(long, value_name = "FILE")]
    pub uavs: Option<PathBuf>,

    /// CSV file with subsystem rows
    #[arg(long, value_name = "FILE")]
    pub subsystems: Option<PathBuf>,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// The x attribute (e.g. mtow_kg)
    pub x: String,

    /// The y attribute (e.g. range_km)
    pub y: String,

    /// The regression model to fit
    #[arg(short, long, value_enum, default_value = "linear")]
    pub model: ModelKind,

    /// Restrict to one aircraft category
    #[arg(short = 'C', long)]
    pub category: Option<String>,

    /// Rank records by y/x instead of fitting a model
    #[arg(long)]
    pub ratio: bool,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Extract command arguments.
#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// The case to extract from
    pub case: String,

    /// AI service preset selecting the default base URL
    #[arg(short, long, value_enum)]
    pub service: Option<Service>,

    /// Chat model name (defaults to the configured model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Endpoint base URL, overriding the service preset
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key (falls back to the UAVDEX_API_KEY environment variable)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Add the extracted record to the aircraft collection
    #[arg(long)]
    pub save: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
