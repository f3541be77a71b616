//! In-memory namespace implementation.

use std::collections::{BTreeMap, HashMap};
use std::io;

use super::{Namespace, NamespaceError, Section, bounded, check_name};

/// A [`Namespace`] held entirely in memory.
///
/// Used in tests and as a scratch store. It can be told to fail every open to
/// simulate uninitialized or corrupted storage, and counts the writes made
/// through it.
#[derive(Debug, Default, Clone)]
pub struct MemoryNamespace {
    sections: HashMap<String, BTreeMap<String, String>>,
    unavailable: bool,
    failing_key: Option<String>,
    writes: usize,
}

impl MemoryNamespace {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a namespace whose every open fails.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Makes subsequent opens fail (or succeed again).
    pub const fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// Makes every `put_string` for `key` fail (or none, with `None`).
    pub fn set_failing_key(&mut self, key: Option<&str>) {
        self.failing_key = key.map(str::to_string);
    }

    /// Seeds a value directly, bypassing the section handle.
    #[must_use]
    pub fn with_value(mut self, section: &str, key: &str, value: &str) -> Self {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Returns the stored value for `key` in `section`, if any.
    #[must_use]
    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Returns all entries of a section.
    #[must_use]
    pub fn entries(&self, section: &str) -> Option<&BTreeMap<String, String>> {
        self.sections.get(section)
    }

    /// Number of successful `put_string`/`remove_key` calls so far.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl Namespace for MemoryNamespace {
    type Section<'a> = MemorySection<'a>;

    fn open(&mut self, name: &str, read_only: bool) -> Result<MemorySection<'_>, NamespaceError> {
        if self.unavailable {
            return Err(NamespaceError::Unavailable {
                reason: "storage not initialized".to_string(),
            });
        }
        check_name(name)?;

        let entries = if read_only {
            self.sections
                .get_mut(name)
                .ok_or_else(|| NamespaceError::SectionNotFound(name.to_string()))?
        } else {
            self.sections.entry(name.to_string()).or_default()
        };

        Ok(MemorySection {
            name: name.to_string(),
            read_only,
            entries,
            failing_key: self.failing_key.as_deref(),
            writes: &mut self.writes,
        })
    }
}

/// Open section of a [`MemoryNamespace`].
#[derive(Debug)]
pub struct MemorySection<'a> {
    name: String,
    read_only: bool,
    entries: &'a mut BTreeMap<String, String>,
    failing_key: Option<&'a str>,
    writes: &'a mut usize,
}

impl MemorySection<'_> {
    fn check_writable(&self) -> Result<(), NamespaceError> {
        if self.read_only {
            return Err(NamespaceError::ReadOnly(self.name.clone()));
        }
        Ok(())
    }
}

impl Section for MemorySection<'_> {
    fn get_string(&self, key: &str, max_len: usize) -> String {
        self.entries
            .get(key)
            .map(|value| bounded(value, max_len).to_string())
            .unwrap_or_default()
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), NamespaceError> {
        self.check_writable()?;
        check_name(key)?;
        if self.failing_key == Some(key) {
            return Err(NamespaceError::Write(io::Error::other(format!(
                "write of '{key}' refused"
            ))));
        }
        self.entries.insert(key.to_string(), value.to_string());
        *self.writes += 1;
        Ok(())
    }

    fn remove_key(&mut self, key: &str) -> Result<bool, NamespaceError> {
        self.check_writable()?;
        let removed = self.entries.remove(key).is_some();
        if removed {
            *self.writes += 1;
        }
        Ok(removed)
    }

    fn close(self) -> Result<(), NamespaceError> {
        Ok(())
    }
}
