//! Command-line interface for uavdex.
//!
//! This module provides the CLI structure and command handlers for the
//! `uavdex` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AircraftCommand, CaseCommand, ConfigCommand, ExtractCommand, ImportCommand, ParamCommand,
    StatsCommand, SubsystemCommand,
};

/// uavdex - A UAV specification catalogue
///
/// Maintains a flat-file catalogue of UAV models, subsystems, and design
/// cases, with tabular import, regression statistics, and AI-assisted record
/// extraction from case documents.
#[derive(Debug, Parser)]
#[command(name = "uavdex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the aircraft collection
    #[command(subcommand)]
    Aircraft(AircraftCommand),

    /// Browse the subsystem collection
    #[command(subcommand)]
    Subsystem(SubsystemCommand),

    /// Manage custom statistics parameters
    #[command(subcommand)]
    Param(ParamCommand),

    /// Manage design-case documents
    #[command(subcommand)]
    Case(CaseCommand),

    /// Merge CSV sheets into the collections
    Import(ImportCommand),

    /// Fit a regression over two attributes, or rank by their ratio
    Stats(StatsCommand),

    /// Extract an aircraft record from a case via an AI service
    Extract(ExtractCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
