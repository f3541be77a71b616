//! Default values for configuration options.
//!
//! Factory-default preference values live in [`crate::prefs::defaults`];
//! this module only holds the host tool's own settings.

/// Default path of the preference storage file.
pub const STORAGE_PATH: &str = "cam-prefs.json";

/// Default namespace section.
pub const SECTION: &str = crate::prefs::COMMON_SECTION;
