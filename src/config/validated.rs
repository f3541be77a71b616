//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::address::parse_ipv4;
use crate::namespace::check_name;
use crate::prefs::{ConfigField, FactoryDefaults, PrefValue};

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Preference storage file
    pub storage_path: PathBuf,

    /// Namespace section holding the preferences
    pub section: String,

    /// Factory defaults, built-ins overridden by the config file
    pub defaults: FactoryDefaults,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ storage: {}, section: {}, default_ssid: {}, module_type: {} }}",
            self.storage_path.display(),
            self.section,
            self.defaults.get(ConfigField::Ssid),
            self.defaults.get(ConfigField::ModuleType),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The section name is empty or longer than 15 bytes
    /// - A default value exceeds 63 bytes
    /// - The default SSID is empty
    /// - A default address is not a dotted-decimal IPv4 address
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let storage_path = Self::resolve_storage_path(cli, toml);
        let section = Self::resolve_section(cli, toml)?;
        let defaults = Self::build_defaults(toml)?;

        Ok(Self {
            storage_path,
            section,
            defaults,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_storage_path(cli: &Cli, toml: Option<&TomlConfig>) -> PathBuf {
        cli.storage.clone().unwrap_or_else(|| {
            toml.and_then(|t| t.storage.path.as_deref())
                .unwrap_or(defaults::STORAGE_PATH)
                .into()
        })
    }

    fn resolve_section(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let name = cli
            .section
            .as_deref()
            .or_else(|| toml.and_then(|t| t.storage.section.as_deref()))
            .unwrap_or(defaults::SECTION);

        if name.is_empty() {
            return Err(ConfigError::InvalidSection {
                name: name.to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        check_name(name).map_err(|e| ConfigError::InvalidSection {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(name.to_string())
    }

    fn build_defaults(toml: Option<&TomlConfig>) -> Result<FactoryDefaults, ConfigError> {
        let mut defaults = FactoryDefaults::default();
        let Some(toml) = toml else {
            return Ok(defaults);
        };

        for field in ConfigField::ALL {
            let Some(text) = toml.defaults.get(field) else {
                continue;
            };

            let value =
                PrefValue::new(text).map_err(|e| ConfigError::invalid_default(field.key(), e))?;

            if field == ConfigField::Ssid && value.is_empty() {
                return Err(ConfigError::invalid_default(field.key(), "must not be empty"));
            }

            if field.is_address() {
                parse_ipv4(value.as_str())
                    .map_err(|e| ConfigError::invalid_default(field.key(), e))?;
            }

            defaults = defaults.with(field, value);
        }

        Ok(defaults)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
