//! Factory-default preference values.
//!
//! The built-in table matches the stock ESP32-CAM build; deployments replace
//! individual entries through the `[defaults]` section of the config file.

use super::field::{ConfigField, FIELD_COUNT};
use super::value::PrefValue;

/// Built-in default SSID.
pub const SSID: &str = "ESP32_Administration_Network";

/// Built-in default passphrase.
pub const PASSPHRASE: &str = "pass_phrase";

/// Built-in default static IP address.
pub const IP_ADDRESS: &str = "192.168.1.254";

/// Built-in default gateway.
pub const GATEWAY: &str = "192.168.0.1";

/// Built-in default network mask.
pub const NETMASK: &str = "255.255.0.0";

/// Built-in default module type.
pub const MODULE_TYPE: &str = "ESP32-CAM";

/// The value every field takes after a first boot or factory reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryDefaults {
    values: [PrefValue; FIELD_COUNT],
}

impl Default for FactoryDefaults {
    fn default() -> Self {
        let builtin = |field: ConfigField| match field {
            ConfigField::Ssid => SSID,
            ConfigField::Passphrase => PASSPHRASE,
            ConfigField::IpAddress => IP_ADDRESS,
            ConfigField::Gateway => GATEWAY,
            ConfigField::NetMask => NETMASK,
            ConfigField::ModuleType => MODULE_TYPE,
        };
        Self {
            values: ConfigField::ALL.map(|field| PrefValue::truncated(builtin(field))),
        }
    }
}

impl FactoryDefaults {
    /// Returns the default for `field`.
    #[must_use]
    pub fn get(&self, field: ConfigField) -> &PrefValue {
        &self.values[field.index()]
    }

    /// Replaces the default for `field`.
    #[must_use]
    pub fn with(mut self, field: ConfigField, value: PrefValue) -> Self {
        self.values[field.index()] = value;
        self
    }

    /// Iterates over all fields and their defaults in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (ConfigField, &PrefValue)> {
        ConfigField::ALL.into_iter().zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_ipv4;

    #[test]
    fn builtin_values() {
        let defaults = FactoryDefaults::default();
        assert_eq!(*defaults.get(ConfigField::Ssid), SSID);
        assert_eq!(*defaults.get(ConfigField::Passphrase), PASSPHRASE);
        assert_eq!(*defaults.get(ConfigField::IpAddress), IP_ADDRESS);
        assert_eq!(*defaults.get(ConfigField::Gateway), GATEWAY);
        assert_eq!(*defaults.get(ConfigField::NetMask), NETMASK);
        assert_eq!(*defaults.get(ConfigField::ModuleType), MODULE_TYPE);
    }

    #[test]
    fn builtin_addresses_parse() {
        let defaults = FactoryDefaults::default();
        for (field, value) in defaults.iter().filter(|(f, _)| f.is_address()) {
            assert!(parse_ipv4(value.as_str()).is_ok(), "{field}");
        }
    }

    #[test]
    fn with_replaces_one_entry() {
        let defaults = FactoryDefaults::default()
            .with(ConfigField::Ssid, PrefValue::new("Workshop").unwrap());
        assert_eq!(*defaults.get(ConfigField::Ssid), "Workshop");
        assert_eq!(*defaults.get(ConfigField::Passphrase), PASSPHRASE);
    }

    #[test]
    fn iter_yields_every_field_in_order() {
        let fields: Vec<_> = FactoryDefaults::default().iter().map(|(f, _)| f).collect();
        assert_eq!(fields, ConfigField::ALL);
    }
}
