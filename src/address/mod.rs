//! Dotted-quad address codec.
//!
//! Converts the textual form of IPv4 addresses, gateways and netmasks
//! (`"192.168.1.254"`) into the fixed 4-byte form consumed by the network
//! stack, and back again for diagnostics.
//!
//! # Malformed Input
//!
//! Parsing is strict: the text must contain exactly four non-empty tokens,
//! each of which must parse as a byte in the requested radix. Anything else
//! is reported as an [`AddressError`]; no partial output is ever produced.

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::fmt::Write as _;
use std::net::Ipv4Addr;

use thiserror::Error;

/// Number of bytes in a dotted-quad address.
pub const OCTETS: usize = 4;

/// Separator used by the dotted-decimal notation.
pub const DOT: char = '.';

/// Radix used by the dotted-decimal notation.
pub const DECIMAL: u32 = 10;

/// Error type for dotted-quad parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The text did not split into exactly four tokens.
    #[error("expected {OCTETS} tokens, found {found}")]
    WrongTokenCount {
        /// Number of tokens actually present
        found: usize,
    },

    /// A token between two separators was empty.
    #[error("token {index} is empty")]
    EmptyToken {
        /// Zero-based token position
        index: usize,
    },

    /// A token contained characters that are not digits in the radix.
    #[error("token {index} ('{token}') is not a number")]
    InvalidToken {
        /// Zero-based token position
        index: usize,
        /// The offending token
        token: String,
    },

    /// A token was numeric but does not fit in a byte.
    #[error("token {index} ('{token}') is out of byte range")]
    OutOfRange {
        /// Zero-based token position
        index: usize,
        /// The offending token
        token: String,
    },

    /// The requested radix is not supported by `from_str_radix`.
    #[error("unsupported radix {0}, expected 2..=36")]
    InvalidRadix(u32),
}

/// Parses `text` into four bytes, splitting on `separator` and reading each
/// token in `radix`.
///
/// Leading and trailing ASCII whitespace around the whole text is ignored;
/// whitespace inside a token is not.
///
/// # Errors
///
/// Returns an error if the radix is unsupported, the token count is not
/// exactly four, or any token is empty, non-numeric or larger than a byte.
///
/// # Example
///
/// ```
/// use cam_prefs::address::parse_dotted_quad;
///
/// assert_eq!(parse_dotted_quad("192.168.1.254", '.', 10), Ok([192, 168, 1, 254]));
/// assert!(parse_dotted_quad("192.168.1", '.', 10).is_err());
/// ```
pub fn parse_dotted_quad(
    text: &str,
    separator: char,
    radix: u32,
) -> Result<[u8; OCTETS], AddressError> {
    if !(2..=36).contains(&radix) {
        return Err(AddressError::InvalidRadix(radix));
    }

    let tokens: Vec<&str> = text.trim_ascii().split(separator).collect();
    if tokens.len() != OCTETS {
        return Err(AddressError::WrongTokenCount {
            found: tokens.len(),
        });
    }

    let mut bytes = [0u8; OCTETS];
    for (index, (slot, token)) in bytes.iter_mut().zip(tokens).enumerate() {
        *slot = parse_token(index, token, radix)?;
    }
    Ok(bytes)
}

/// Parses a dotted-decimal string into an [`Ipv4Addr`].
///
/// # Errors
///
/// Same as [`parse_dotted_quad`].
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr, AddressError> {
    parse_dotted_quad(text, DOT, DECIMAL).map(Ipv4Addr::from)
}

/// Formats four bytes as decimal tokens joined by `separator`.
#[must_use]
pub fn format_dotted_quad(bytes: [u8; OCTETS], separator: char) -> String {
    let mut out = String::with_capacity(15);
    for (index, byte) in bytes.iter().enumerate() {
        if index > 0 {
            out.push(separator);
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{byte}");
    }
    out
}

fn parse_token(index: usize, token: &str, radix: u32) -> Result<u8, AddressError> {
    if token.is_empty() {
        return Err(AddressError::EmptyToken { index });
    }

    // from_str_radix accepts a leading '+', the notation does not.
    if !token.chars().all(|c| c.is_digit(radix)) {
        return Err(AddressError::InvalidToken {
            index,
            token: token.to_string(),
        });
    }

    u8::from_str_radix(token, radix).map_err(|_| AddressError::OutOfRange {
        index,
        token: token.to_string(),
    })
}
