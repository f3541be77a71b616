//! Persistent key-value namespace abstraction.
//!
//! Models the non-volatile preference storage of the module: a store
//! partitioned into named sections, each holding string values under short
//! keys. Sections are opened for the duration of one operation and released
//! when the handle goes out of scope.
//!
//! # Limits
//!
//! Section and key names are limited to [`MAX_NAME_LEN`] bytes. Values
//! are read through a caller-provided buffer size that includes a
//! terminator, so at most `max_len - 1` bytes of text are returned.
//!
//! # Testing
//!
//! Use [`MemoryNamespace`] to avoid filesystem dependencies.

mod file;
mod memory;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileNamespace;
pub use memory::MemoryNamespace;

use std::io;

use thiserror::Error;

/// Maximum length of a section or key name.
pub const MAX_NAME_LEN: usize = 15;

/// Errors that can occur while accessing the namespace.
#[derive(Debug, Error)]
pub enum NamespaceError {
    /// The backing storage could not be opened.
    #[error("Storage unavailable: {reason}")]
    Unavailable {
        /// Why the storage could not be opened
        reason: String,
    },

    /// The backing storage exists but its contents are unusable.
    #[error("Storage corrupted: {reason}")]
    Corrupted {
        /// What is wrong with the stored data
        reason: String,
    },

    /// A read-only open was requested for a section that does not exist.
    #[error("Section '{0}' not found")]
    SectionNotFound(String),

    /// A section or key name exceeds [`MAX_NAME_LEN`].
    #[error("Name '{name}' exceeds {MAX_NAME_LEN} bytes")]
    NameTooLong {
        /// The rejected name
        name: String,
    },

    /// A write was attempted through a read-only section handle.
    #[error("Section '{0}' is open read-only")]
    ReadOnly(String),

    /// Failed to persist the section contents.
    #[error("Failed to write storage: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize the section contents.
    #[error("Failed to serialize storage: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A key-value store partitioned into named sections.
pub trait Namespace {
    /// Handle to one open section.
    type Section<'a>: Section
    where
        Self: 'a;

    /// Opens the named section.
    ///
    /// A read-write open creates the section if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage is unavailable or corrupted, the name
    /// is too long, or a read-only open targets a missing section.
    fn open(&mut self, name: &str, read_only: bool) -> Result<Self::Section<'_>, NamespaceError>;
}

/// An open namespace section.
///
/// Dropping the handle closes the section. Use [`Section::close`] to observe
/// errors that occur while releasing it.
pub trait Section {
    /// Returns the value stored under `key`, or an empty string if absent.
    ///
    /// `max_len` is the size of the caller's buffer including a terminator;
    /// longer values are cut at the last character boundary that fits.
    fn get_string(&self, key: &str, max_len: usize) -> String;

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is read-only or the key is too long.
    fn put_string(&mut self, key: &str, value: &str) -> Result<(), NamespaceError>;

    /// Removes `key`, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is read-only.
    fn remove_key(&mut self, key: &str) -> Result<bool, NamespaceError>;

    /// Closes the section, flushing any pending changes.
    ///
    /// # Errors
    ///
    /// Returns an error if pending changes cannot be persisted.
    fn close(self) -> Result<(), NamespaceError>
    where
        Self: Sized;
}

/// Checks a section or key name against [`MAX_NAME_LEN`].
///
/// # Errors
///
/// Returns [`NamespaceError::NameTooLong`] if the name is too long.
pub fn check_name(name: &str) -> Result<(), NamespaceError> {
    if name.len() > MAX_NAME_LEN {
        return Err(NamespaceError::NameTooLong {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Cuts `value` so it fits a buffer of `max_len` bytes including terminator.
#[must_use]
pub fn bounded(value: &str, max_len: usize) -> &str {
    let limit = max_len.saturating_sub(1);
    if value.len() <= limit {
        return value;
    }
    let mut end = limit;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
