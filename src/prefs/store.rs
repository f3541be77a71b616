//! Staged preference store.

use thiserror::Error;

use crate::address::{AddressError, DECIMAL, DOT, parse_dotted_quad};
use crate::namespace::{Namespace, NamespaceError, Section};

use super::defaults::FactoryDefaults;
use super::field::{ConfigField, FIELD_COUNT};
use super::snapshot::{ConfigSnapshot, NetworkConfig};
use super::value::{BUFFER_LEN, PrefValue, ValueTooLong};

/// Name of the namespace section holding the common preferences.
pub const COMMON_SECTION: &str = "Common";

/// Result of [`PrefsStore::load`].
///
/// None of these is fatal; the device keeps running with whatever the
/// snapshot holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Existing preferences were read.
    Loaded,

    /// The SSID was missing, so every field was written with its factory
    /// default before being read back.
    Initialized {
        /// Whether the SSID was removed on purpose to force this.
        factory_reset: bool,
    },

    /// The SSID was missing and the factory defaults could not be written.
    /// The snapshot holds the defaults in memory only.
    DefaultsUnsaved {
        /// Reason reported by the namespace.
        reason: String,
    },

    /// The section could not be opened. The snapshot was left untouched.
    Unavailable {
        /// Reason reported by the namespace.
        reason: String,
    },
}

impl LoadOutcome {
    /// Returns `true` if the section could be opened.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }

    /// Returns `true` if factory defaults were written.
    #[must_use]
    pub const fn wrote_defaults(&self) -> bool {
        matches!(self, Self::Initialized { .. })
    }
}

/// Why a recognized field refused a staged value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageRejection {
    /// The value does not fit the storage buffer.
    #[error(transparent)]
    TooLong(#[from] ValueTooLong),

    /// An address field received text that is not a dotted-decimal address.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// The SSID cannot be cleared; an empty SSID marks uninitialized storage.
    #[error("SSID must not be empty")]
    EmptySsid,
}

/// Result of [`PrefsStore::stage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The value differs from the current one and is now pending.
    Staged,

    /// The value equals the current one; nothing is pending for the field.
    Unchanged,

    /// The field was recognized but the value was refused.
    Rejected(StageRejection),

    /// The key does not name a stageable field.
    Unrecognized,
}

impl StageOutcome {
    /// Returns `true` if the key belonged to this store.
    ///
    /// Command dispatchers use this to decide whether to try other handlers.
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        !matches!(self, Self::Unrecognized)
    }
}

/// Errors from operations that write to storage.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// The namespace failed.
    #[error("Preference storage error: {0}")]
    Storage(#[from] NamespaceError),

    /// The value does not fit the storage buffer.
    #[error("Invalid preference value: {0}")]
    Value(#[from] ValueTooLong),

    /// The key belongs to a staged field and must go through stage/commit.
    #[error("'{key}' is a staged preference; use stage and commit")]
    StagedField {
        /// The rejected key
        key: String,
    },

    /// The key does not name any preference.
    #[error("Unknown preference key '{0}'")]
    UnknownKey(String),
}

/// Persisted preferences with staged changes.
///
/// Holds the current value of every field, a pending value for fields
/// changed since the last load or commit, and the factory defaults.
///
/// # Lifecycle
///
/// 1. [`load`](Self::load) at startup reads the section, writing defaults on
///    first boot.
/// 2. [`stage`](Self::stage) buffers changes arriving from API commands.
/// 3. [`commit`](Self::commit) writes pending values and makes them current,
///    typically just before a reboot.
///
/// Staged changes that are never committed are lost.
///
/// The store is not synchronized; wrap it in a mutex if it is shared
/// between threads.
#[derive(Debug)]
pub struct PrefsStore<N> {
    namespace: N,
    section: String,
    defaults: FactoryDefaults,
    snapshot: ConfigSnapshot,
    pending: [Option<PrefValue>; FIELD_COUNT],
}

impl<N: Namespace> PrefsStore<N> {
    /// Creates a store over the [`COMMON_SECTION`] of `namespace`.
    ///
    /// The snapshot starts empty until [`load`](Self::load) is called.
    pub fn new(namespace: N, defaults: FactoryDefaults) -> Self {
        Self::with_section(namespace, COMMON_SECTION, defaults)
    }

    /// Creates a store over a specific section of `namespace`.
    pub fn with_section(namespace: N, section: impl Into<String>, defaults: FactoryDefaults) -> Self {
        Self {
            namespace,
            section: section.into(),
            defaults,
            snapshot: ConfigSnapshot::default(),
            pending: Default::default(),
        }
    }

    /// Reads every field from storage into the snapshot.
    ///
    /// With `factory_reset`, the SSID key is removed first so that all
    /// fields are rewritten with their defaults. Any pending changes are
    /// dropped once the section is open.
    pub fn load(&mut self, factory_reset: bool) -> LoadOutcome {
        let mut section = match self.namespace.open(&self.section, false) {
            Ok(section) => section,
            Err(e) => {
                tracing::error!("Failed to start preferences: {e}");
                return LoadOutcome::Unavailable {
                    reason: e.to_string(),
                };
            }
        };
        self.pending = Default::default();

        if factory_reset {
            tracing::info!("Factory reset requested");
            if let Err(e) = section.remove_key(ConfigField::Ssid.key()) {
                tracing::warn!("Failed to remove {}: {e}", ConfigField::Ssid);
            }
        }

        let initialized = section
            .get_string(ConfigField::Ssid.key(), BUFFER_LEN)
            .is_empty();
        let mut unsaved = None;
        if initialized {
            tracing::info!("Preferences need init");
            if let Err(e) = write_defaults(&mut section, &self.defaults) {
                tracing::warn!("Failed to write default preferences: {e}");
                unsaved = Some(e.to_string());
            }
        }

        for field in ConfigField::ALL {
            let text = PrefValue::truncated(&section.get_string(field.key(), BUFFER_LEN));
            if let Err(e) = self.snapshot.set(field, text) {
                tracing::warn!(
                    "Stored {} '{}' is not a valid address: {e}",
                    field.label(),
                    self.snapshot.get(field)
                );
            }
        }

        if let Err(e) = section.close() {
            tracing::warn!("Failed to close preferences: {e}");
        }

        if unsaved.is_some() || !self.snapshot.is_initialized() {
            tracing::warn!("Preferences not initialized in storage, using factory defaults");
            self.snapshot = ConfigSnapshot::from_defaults(&self.defaults);
            if unsaved.is_none() {
                unsaved = Some("SSID still empty after initialization".to_string());
            }
        }

        for line in self.snapshot.to_string().lines() {
            tracing::info!("{line}");
        }

        if let Some(reason) = unsaved {
            LoadOutcome::DefaultsUnsaved { reason }
        } else if initialized {
            LoadOutcome::Initialized { factory_reset }
        } else {
            LoadOutcome::Loaded
        }
    }

    /// Buffers a new value for `field`.
    ///
    /// A value equal to the current one clears any earlier pending value for
    /// the field. Address fields only accept valid dotted-decimal text.
    pub fn stage(&mut self, field: ConfigField, value: &str) -> StageOutcome {
        if !field.is_stageable() {
            return StageOutcome::Unrecognized;
        }

        let value = match validate(field, value) {
            Ok(value) => value,
            Err(rejection) => {
                tracing::warn!("Rejected {field} change: {rejection}");
                return StageOutcome::Rejected(rejection);
            }
        };

        let slot = &mut self.pending[field.index()];
        if value == *self.snapshot.get(field) {
            *slot = None;
            return StageOutcome::Unchanged;
        }

        tracing::debug!("Staged {field} change");
        *slot = Some(value);
        StageOutcome::Staged
    }

    /// Buffers a new value for the field named by `key`.
    ///
    /// `key` may be the persistent key or the API command name. Returns
    /// [`StageOutcome::Unrecognized`] for anything else.
    pub fn stage_key(&mut self, key: &str, value: &str) -> StageOutcome {
        let outcome = ConfigField::from_key(key)
            .map_or(StageOutcome::Unrecognized, |field| self.stage(field, value));

        if outcome.is_handled() {
            let shown = if ConfigField::from_key(key).is_some_and(ConfigField::is_secret) {
                "********"
            } else {
                value
            };
            tracing::info!("API extension command -> command = {key}  Value = {shown}");
        }
        outcome
    }

    /// Writes every pending value to storage and makes it current.
    ///
    /// Returns the number of fields written. Without pending values the
    /// storage is not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the section cannot be opened or a write fails.
    /// Fields written before the failure are committed; the rest stay
    /// pending.
    pub fn commit(&mut self) -> Result<usize, PrefsError> {
        if !self.has_pending() {
            return Ok(0);
        }

        let mut section = self.namespace.open(&self.section, false)?;
        let mut written = Vec::with_capacity(FIELD_COUNT);
        let mut failure = None;

        for field in ConfigField::ALL {
            let Some(value) = &self.pending[field.index()] else {
                continue;
            };
            match section.put_string(field.key(), value.as_str()) {
                Ok(()) => written.push(field),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        section.close()?;

        for &field in &written {
            if let Some(value) = self.pending[field.index()].take() {
                // Staging only admits valid addresses.
                let _ = self.snapshot.set(field, value);
            }
        }

        if let Some(e) = failure {
            tracing::error!("Commit stopped after {} field(s): {e}", written.len());
            return Err(e.into());
        }

        tracing::info!("Committed {} preference change(s)", written.len());
        Ok(written.len())
    }

    /// Drops every pending value, returning how many there were.
    pub fn discard(&mut self) -> usize {
        let count = self.pending.iter().filter(|p| p.is_some()).count();
        self.pending = Default::default();
        count
    }

    /// Writes an administrative field straight to storage.
    ///
    /// Only fields outside the staged set are accepted, so each field has a
    /// single mutation path.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or staged, the value is too
    /// long, or the write fails.
    pub fn update_single(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        let field = ConfigField::from_key(key).ok_or_else(|| PrefsError::UnknownKey(key.to_string()))?;
        if field.is_stageable() {
            return Err(PrefsError::StagedField {
                key: key.to_string(),
            });
        }
        let value = PrefValue::new(value)?;

        let mut section = self.namespace.open(&self.section, false)?;
        section.put_string(field.key(), value.as_str())?;
        section.close()?;

        tracing::info!("Updated {field} -> {value}");
        let _ = self.snapshot.set(field, value);
        Ok(())
    }

    /// Returns `true` if `field` has a pending value.
    #[must_use]
    pub fn is_dirty(&self, field: ConfigField) -> bool {
        self.pending[field.index()].is_some()
    }

    /// Returns `true` if any field has a pending value.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(Option::is_some)
    }

    /// Returns the pending value of `field`, if any.
    #[must_use]
    pub fn pending(&self, field: ConfigField) -> Option<&str> {
        self.pending[field.index()].as_ref().map(PrefValue::as_str)
    }

    /// Returns the current values.
    #[must_use]
    pub const fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }

    /// Returns the factory defaults.
    #[must_use]
    pub const fn defaults(&self) -> &FactoryDefaults {
        &self.defaults
    }

    /// Returns the network settings for the Wi-Fi stack.
    ///
    /// An uninitialized snapshot is reset to the factory defaults first.
    pub fn network_config(&mut self) -> NetworkConfig {
        if !self.snapshot.is_initialized() {
            tracing::warn!("Preferences uninitialized, using factory defaults");
            self.snapshot = ConfigSnapshot::from_defaults(&self.defaults);
        }
        NetworkConfig::from(&self.snapshot)
    }

    /// Returns the underlying namespace.
    #[must_use]
    pub const fn namespace(&self) -> &N {
        &self.namespace
    }

    /// Returns the underlying namespace mutably.
    pub const fn namespace_mut(&mut self) -> &mut N {
        &mut self.namespace
    }

    /// Consumes the store, returning the underlying namespace.
    pub fn into_namespace(self) -> N {
        self.namespace
    }
}

fn validate(field: ConfigField, value: &str) -> Result<PrefValue, StageRejection> {
    let value = PrefValue::new(value)?;
    if field == ConfigField::Ssid && value.is_empty() {
        return Err(StageRejection::EmptySsid);
    }
    if field.is_address() {
        parse_dotted_quad(value.as_str(), DOT, DECIMAL)?;
    }
    Ok(value)
}

fn write_defaults<S: Section>(
    section: &mut S,
    defaults: &FactoryDefaults,
) -> Result<(), NamespaceError> {
    for (field, value) in defaults.iter() {
        section.put_string(field.key(), value.as_str())?;
    }
    Ok(())
}
