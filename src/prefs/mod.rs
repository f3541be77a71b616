//! Staged device preferences.
//!
//! This module provides:
//! - The fixed field set ([`ConfigField`])
//! - Bounded preference text ([`PrefValue`])
//! - Factory defaults ([`FactoryDefaults`])
//! - Current values and their decoded forms ([`ConfigSnapshot`], [`NetworkConfig`])
//! - The staged store itself ([`PrefsStore`])
//!
//! # Mutation Paths
//!
//! Network fields (SSID, passphrase, IP address, gateway, mask) change only
//! through [`PrefsStore::stage`] followed by [`PrefsStore::commit`]. The
//! module type is administrative and changes only through
//! [`PrefsStore::update_single`]. No field has both paths.

pub mod defaults;
mod field;
mod snapshot;
mod store;
mod value;


pub use defaults::FactoryDefaults;
pub use field::{ConfigField, FIELD_COUNT};
pub use snapshot::{ConfigSnapshot, NetworkConfig};
pub use store::{
    COMMON_SECTION, LoadOutcome, PrefsError, PrefsStore, StageOutcome, StageRejection,
};
pub use value::{BUFFER_LEN, MAX_VALUE_LEN, PrefValue, ValueTooLong};
