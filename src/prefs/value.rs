//! Bounded-length preference text.

use std::fmt;

use thiserror::Error;

use crate::namespace::bounded;

/// Size of the storage read buffer, including the terminator.
pub const BUFFER_LEN: usize = 64;

/// Maximum length of a preference value in bytes.
pub const MAX_VALUE_LEN: usize = BUFFER_LEN - 1;

/// A value was longer than [`MAX_VALUE_LEN`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value is {len} bytes, maximum is {MAX_VALUE_LEN}")]
pub struct ValueTooLong {
    /// Length of the rejected value in bytes
    pub len: usize,
}

/// Preference text of at most [`MAX_VALUE_LEN`] bytes.
///
/// Values arriving through the API are rejected when too long
/// ([`PrefValue::new`]); values read back from storage are cut to fit
/// ([`PrefValue::truncated`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PrefValue(String);

impl PrefValue {
    /// Creates a value, rejecting text that does not fit.
    ///
    /// # Errors
    ///
    /// Returns [`ValueTooLong`] if `text` exceeds [`MAX_VALUE_LEN`] bytes.
    pub fn new(text: impl Into<String>) -> Result<Self, ValueTooLong> {
        let text = text.into();
        if text.len() > MAX_VALUE_LEN {
            return Err(ValueTooLong { len: text.len() });
        }
        Ok(Self(text))
    }

    /// Creates a value, cutting text at the last character boundary that fits.
    #[must_use]
    pub fn truncated(text: &str) -> Self {
        Self(bounded(text, BUFFER_LEN).to_string())
    }

    /// Returns the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for PrefValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PrefValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PrefValue {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_maximum_length() {
        let text = "a".repeat(MAX_VALUE_LEN);
        assert_eq!(PrefValue::new(text.clone()).unwrap().as_str(), text);
    }

    #[test]
    fn new_rejects_overlong_text() {
        let result = PrefValue::new("a".repeat(BUFFER_LEN));
        assert_eq!(result, Err(ValueTooLong { len: BUFFER_LEN }));
    }

    #[test]
    fn truncated_cuts_to_fit() {
        let value = PrefValue::truncated(&"b".repeat(100));
        assert_eq!(value.as_str().len(), MAX_VALUE_LEN);
    }

    #[test]
    fn truncated_respects_char_boundaries() {
        // 31 two-byte chars = 62 bytes, then one more would be 64.
        let text = "é".repeat(32);
        let value = PrefValue::truncated(&text);
        assert_eq!(value.as_str().len(), 62);
        assert_eq!(value.as_str().chars().count(), 31);
    }

    #[test]
    fn compares_with_str() {
        let value = PrefValue::new("Home").unwrap();
        assert_eq!(value, "Home");
        assert!(value != "Away");
    }

    #[test]
    fn default_is_empty() {
        assert!(PrefValue::default().is_empty());
    }
}
