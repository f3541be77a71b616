//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::address::{DECIMAL, DOT};

/// cam-prefs: ESP32 camera module preferences
///
/// Loads, stages and commits the persisted network settings and module
/// identity of a camera module.
#[derive(Debug, Parser)]
#[command(name = "cam-prefs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (defaults to `show`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the preference storage file
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Namespace section holding the preferences
    #[arg(long, global = true)]
    pub section: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for cam-prefs
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "cam-prefs.toml")]
        output: PathBuf,
    },

    /// Load the preferences and print them
    Show {
        /// Rewrite every preference with its factory default first
        #[arg(long = "factory-reset")]
        factory_reset: bool,
    },

    /// Stage preference changes and commit them
    Set {
        /// Changes as KEY=VALUE (persistent key or API command name)
        #[arg(value_name = "KEY=VALUE", required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,

        /// Stage and report the changes without committing them
        #[arg(long = "dry-run")]
        dry_run: bool,
    },

    /// Dispatch HTTP control request targets as the web server would
    Request {
        /// Request targets, e.g. '/control?var=net_ssid&val=Home'
        #[arg(value_name = "TARGET", required = true)]
        targets: Vec<String>,
    },

    /// Write an administrative preference directly
    Write {
        /// Preference key
        key: String,
        /// New value
        value: String,
    },

    /// Parse a dotted address and print its bytes
    ParseAddress {
        /// Address text
        text: String,

        /// Token separator
        #[arg(long, default_value_t = DOT)]
        separator: char,

        /// Numeric base of each token
        #[arg(long, default_value_t = DECIMAL)]
        radix: u32,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns the subcommand to run, `show` when none was given.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Show {
            factory_reset: false,
        })
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}

/// Splits a `KEY=VALUE` argument at the first `=`.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}
