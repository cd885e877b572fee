//! Command-line interface for flightdesk.
//!
//! This module provides the CLI structure and command handlers for the
//! `fdesk` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    BoardCommand, ConfigCommand, DeleteCommand, DropCommand, InitCommand, InsertCommand,
    ListCommand, SearchCommand, ShowCommand, StatsCommand, TeardownCommand, UpdateCommand,
};

/// fdesk - Manage pilots, destinations and flights
///
/// Keeps flight records in a local SQLite database, with one-shot commands
/// for scripting and an interactive menu for data entry.
#[derive(Debug, Parser)]
#[command(name = "fdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database name (file `<Name>.db` in the data directory)
    #[arg(short, long, global = true)]
    pub name: Option<String>,

    /// Explicit database file, overriding --name
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

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
    /// Create the tables and load seed data
    Init(InitCommand),

    /// Show every row of a table
    List(ListCommand),

    /// Show one record by id
    Show(ShowCommand),

    /// Find records whose column equals a value
    Search(SearchCommand),

    /// Add a record
    Insert(InsertCommand),

    /// Change one column of a record
    Update(UpdateCommand),

    /// Remove a record by id
    Delete(DeleteCommand),

    /// Show flights with their route and pilot
    Board(BoardCommand),

    /// Show row counts and database details
    Stats(StatsCommand),

    /// Drop a table
    Drop(DropCommand),

    /// Delete the database file
    Teardown(TeardownCommand),

    /// Run the interactive menu
    Menu,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
