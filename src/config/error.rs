//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid namespace section name.
    #[error("Invalid section name '{name}': {reason}")]
    InvalidSection {
        /// The rejected name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid factory-default value.
    #[error("Invalid default for {field}: {reason}")]
    InvalidDefault {
        /// Persistent key of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },
}

impl ConfigError {
    /// Creates an `InvalidDefault` error.
    #[must_use]
    pub fn invalid_default(field: &'static str, reason: impl ToString) -> Self {
        Self::InvalidDefault {
            field,
            reason: reason.to_string(),
        }
    }
}
