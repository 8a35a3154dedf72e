//! Command-line interface for genealogy-snippets.
//!
//! This module provides the CLI structure for the `gensnip` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ClearCommand, ConfigCommand, OutputFormat, ShowCommand, StatusCommand,
};

/// gensnip - Keep the genealogy snippets your browser captures
///
/// Stores GEDCOM X records pushed by the browser extension and shows them
/// grouped into immediate families.
#[derive(Debug, Parser)]
#[command(name = "gensnip")]
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
    /// Show stored records grouped into families
    Show(ShowCommand),

    /// Show records and redraw whenever the store changes
    Watch(ShowCommand),

    /// Ingest records from a file or stdin
    Add(AddCommand),

    /// Serve the browser extension over native messaging
    Bridge,

    /// Remove every stored record
    Clear(ClearCommand),

    /// Show store status
    Status(StatusCommand),

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
