//! The fixed set of persisted preference fields.

use std::fmt;

/// Number of preference fields.
pub const FIELD_COUNT: usize = 6;

/// A persisted preference of the "Common" section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigField {
    /// Network SSID.
    Ssid,
    /// Network passphrase.
    Passphrase,
    /// Static IP address of the module.
    IpAddress,
    /// Default gateway.
    Gateway,
    /// Network mask.
    NetMask,
    /// Module identity. Administrative; not changeable through staging.
    ModuleType,
}

impl ConfigField {
    /// All fields in storage order.
    pub const ALL: [Self; FIELD_COUNT] = [
        Self::Ssid,
        Self::Passphrase,
        Self::IpAddress,
        Self::Gateway,
        Self::NetMask,
        Self::ModuleType,
    ];

    /// Position of the field in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Persistent key name (at most 15 bytes, never changes).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ssid => "Net_SSID",
            Self::Passphrase => "Net_Pass",
            Self::IpAddress => "Net_IP",
            Self::Gateway => "Net_Gateway",
            Self::NetMask => "Net_Mask",
            Self::ModuleType => "Module_Type",
        }
    }

    /// Name used by HTTP API extension commands.
    #[must_use]
    pub const fn command_name(self) -> &'static str {
        match self {
            Self::Ssid => "net_ssid",
            Self::Passphrase => "net_pass",
            Self::IpAddress => "net_ip_address",
            Self::Gateway => "net_gateway",
            Self::NetMask => "net_mask",
            Self::ModuleType => "module_type",
        }
    }

    /// Human-readable label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ssid => "SSID",
            Self::Passphrase => "Network Passphrase",
            Self::IpAddress => "IPAddress",
            Self::Gateway => "Network Gateway",
            Self::NetMask => "Netmask",
            Self::ModuleType => "Module type",
        }
    }

    /// Returns true for fields holding a dotted-decimal address.
    #[must_use]
    pub const fn is_address(self) -> bool {
        matches!(self, Self::IpAddress | Self::Gateway | Self::NetMask)
    }

    /// Returns true for fields that change through stage/commit.
    #[must_use]
    pub const fn is_stageable(self) -> bool {
        !matches!(self, Self::ModuleType)
    }

    /// Returns true for fields whose value must not appear in logs.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Passphrase)
    }

    /// Looks a field up by persistent key or API command name.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == key || field.command_name() == key)
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
