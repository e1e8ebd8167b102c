//! Defines the command-line arguments and subcommands for the suite CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::prefs::DEFAULT_PREFS_FILE;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "suite",
    version,
    about = "Load, edit, and save browser-automation test suites stored as HTML tables."
)]
pub struct SuiteArgs {
    /// Preferences file remembering the last used suite directory.
    #[arg(long, global = true, default_value = DEFAULT_PREFS_FILE)]
    pub prefs: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the test cases of a suite in order.
    List {
        /// The suite file to read.
        #[arg(required = true)]
        suite: PathBuf,
        /// Print machine-readable JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Create a suite from test-case files.
    New {
        /// The suite file to write.
        #[arg(required = true)]
        suite: PathBuf,
        /// Add every .html test case found under this directory.
        #[arg(long)]
        from: Option<PathBuf>,
        /// Test-case files to add, in order.
        tests: Vec<PathBuf>,
    },
    /// Append a test-case file to a suite.
    Add {
        /// The suite file to update.
        #[arg(required = true)]
        suite: PathBuf,
        /// The test-case file to append.
        #[arg(required = true)]
        test: PathBuf,
        /// Title to list the test case under.
        #[arg(long)]
        title: Option<String>,
    },
    /// Remove a test case from a suite by title.
    Remove {
        /// The suite file to update.
        #[arg(required = true)]
        suite: PathBuf,
        /// Title of the test case to remove.
        #[arg(required = true)]
        title: String,
    },
    /// Report suite members whose files do not exist.
    Check {
        /// The suite file to check.
        #[arg(required = true)]
        suite: PathBuf,
    },
}
