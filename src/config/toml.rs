//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use crate::prefs::ConfigField;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Preference storage section
    #[serde(default)]
    pub storage: StorageSection,

    /// Factory-default overrides
    #[serde(default)]
    pub defaults: DefaultsSection,
}

/// Preference storage configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    /// Path of the storage file
    pub path: Option<String>,

    /// Namespace section holding the preferences
    pub section: Option<String>,
}

/// Factory-default overrides, one entry per preference.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSection {
    /// Default SSID
    pub ssid: Option<String>,

    /// Default passphrase
    pub passphrase: Option<String>,

    /// Default static IP address
    pub ip_address: Option<String>,

    /// Default gateway
    pub gateway: Option<String>,

    /// Default network mask
    pub netmask: Option<String>,

    /// Module type
    pub module_type: Option<String>,
}

impl DefaultsSection {
    /// Returns the override for `field`, if any.
    #[must_use]
    pub fn get(&self, field: ConfigField) -> Option<&str> {
        let value = match field {
            ConfigField::Ssid => &self.ssid,
            ConfigField::Passphrase => &self.passphrase,
            ConfigField::IpAddress => &self.ip_address,
            ConfigField::Gateway => &self.gateway,
            ConfigField::NetMask => &self.netmask,
            ConfigField::ModuleType => &self.module_type,
        };
        value.as_deref()
    }
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# cam-prefs Configuration File

[storage]
# Preference storage file (default: cam-prefs.json, overridden by --storage)
# path = "cam-prefs.json"

# Namespace section, at most 15 bytes (default: Common)
# section = "Common"

[defaults]
# Factory defaults written on first boot and on factory reset.
# Values are limited to 63 bytes; addresses are dotted-decimal.
# ssid = "ESP32_Administration_Network"
# passphrase = "pass_phrase"
# ip_address = "192.168.1.254"
# gateway = "192.168.0.1"
# netmask = "255.255.0.0"

# Module type of this build
# module_type = "ESP32-CAM"
"#
    .to_string()
}
