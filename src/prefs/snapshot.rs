//! Current preference values and their decoded forms.

use std::fmt;
use std::net::Ipv4Addr;

use crate::address::{AddressError, DECIMAL, DOT, OCTETS, parse_dotted_quad};

use super::defaults::FactoryDefaults;
use super::field::{ConfigField, FIELD_COUNT};
use super::value::PrefValue;

/// Text shown in place of secret values.
const MASK: &str = "********";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FieldValue {
    text: PrefValue,
    decoded: Option<[u8; OCTETS]>,
}

/// The current value of every preference field.
///
/// Address fields carry their 4-byte form alongside the text. The two are
/// updated together, so the bytes always reflect the current text; text that
/// does not parse has no decoded form.
///
/// A snapshot whose SSID is empty is uninitialized and must not be consumed
/// until it has been reset to the factory defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    fields: [FieldValue; FIELD_COUNT],
}

impl ConfigSnapshot {
    /// Builds a snapshot holding the factory defaults.
    #[must_use]
    pub fn from_defaults(defaults: &FactoryDefaults) -> Self {
        let mut snapshot = Self::default();
        for (field, value) in defaults.iter() {
            // Invalid default addresses are rejected by the config layer;
            // here they simply stay undecoded.
            let _ = snapshot.set(field, value.clone());
        }
        snapshot
    }

    /// Returns the current text of `field`.
    #[must_use]
    pub fn get(&self, field: ConfigField) -> &str {
        self.fields[field.index()].text.as_str()
    }

    /// Returns the decoded bytes of an address field.
    ///
    /// `None` for non-address fields and for text that did not parse.
    #[must_use]
    pub fn decoded(&self, field: ConfigField) -> Option<[u8; OCTETS]> {
        self.fields[field.index()].decoded
    }

    /// Network SSID.
    #[must_use]
    pub fn ssid(&self) -> &str {
        self.get(ConfigField::Ssid)
    }

    /// Network passphrase.
    #[must_use]
    pub fn passphrase(&self) -> &str {
        self.get(ConfigField::Passphrase)
    }

    /// Module type.
    #[must_use]
    pub fn module_type(&self) -> &str {
        self.get(ConfigField::ModuleType)
    }

    /// Decoded static IP address.
    #[must_use]
    pub fn ip_address(&self) -> Option<[u8; OCTETS]> {
        self.decoded(ConfigField::IpAddress)
    }

    /// Decoded gateway address.
    #[must_use]
    pub fn gateway(&self) -> Option<[u8; OCTETS]> {
        self.decoded(ConfigField::Gateway)
    }

    /// Decoded network mask.
    #[must_use]
    pub fn netmask(&self) -> Option<[u8; OCTETS]> {
        self.decoded(ConfigField::NetMask)
    }

    /// Returns false if the SSID is empty.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.fields[ConfigField::Ssid.index()].text.is_empty()
    }

    /// Iterates over all fields and their text in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (ConfigField, &str)> {
        ConfigField::ALL
            .into_iter()
            .zip(self.fields.iter().map(|value| value.text.as_str()))
    }

    /// Returns the text of `field` as it may appear in logs.
    #[must_use]
    pub fn display_value(&self, field: ConfigField) -> &str {
        let text = self.get(field);
        if field.is_secret() && !text.is_empty() {
            MASK
        } else {
            text
        }
    }

    /// Sets the text of `field` and decodes it immediately.
    ///
    /// The text is stored even when decoding fails; the error is returned so
    /// the caller can report it.
    pub(crate) fn set(&mut self, field: ConfigField, text: PrefValue) -> Result<(), AddressError> {
        let slot = &mut self.fields[field.index()];
        let result = if field.is_address() {
            parse_dotted_quad(text.as_str(), DOT, DECIMAL).map(Some)
        } else {
            Ok(None)
        };
        slot.decoded = result.as_ref().ok().copied().flatten();
        slot.text = text;
        result.map(|_| ())
    }
}

impl fmt::Display for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Preferences:")?;
        for field in ConfigField::ALL {
            writeln!(
                f,
                "\t{} is -> {}",
                field.label(),
                self.display_value(field)
            )?;
        }
        Ok(())
    }
}

/// Network settings as consumed by the Wi-Fi stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network SSID
    pub ssid: String,
    /// Network passphrase
    pub passphrase: String,
    /// Static IP address, if the stored text is valid
    pub ip_address: Option<Ipv4Addr>,
    /// Gateway, if the stored text is valid
    pub gateway: Option<Ipv4Addr>,
    /// Network mask, if the stored text is valid
    pub netmask: Option<Ipv4Addr>,
    /// Module type
    pub module_type: String,
}

impl NetworkConfig {
    /// Returns true if all three static addressing values are usable.
    #[must_use]
    pub const fn has_static_ip(&self) -> bool {
        self.ip_address.is_some() && self.gateway.is_some() && self.netmask.is_some()
    }
}

impl From<&ConfigSnapshot> for NetworkConfig {
    fn from(snapshot: &ConfigSnapshot) -> Self {
        Self {
            ssid: snapshot.ssid().to_string(),
            passphrase: snapshot.passphrase().to_string(),
            ip_address: snapshot.ip_address().map(Ipv4Addr::from),
            gateway: snapshot.gateway().map(Ipv4Addr::from),
            netmask: snapshot.netmask().map(Ipv4Addr::from),
            module_type: snapshot.module_type().to_string(),
        }
    }
}
