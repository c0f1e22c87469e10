//! Address identifier type.

use std::fmt;
use std::str::FromStr;

/// Strongly typed address identifier
///
/// Crash logs do not carry symbol names, only module offsets. Each resolvable
/// offset has a stable decimal identifier (`... -> 12345+0x10`), and the symbol
/// database maps those identifiers to names. This wrapper around `u64` keeps
/// identifiers from being confused with addresses, offsets, or padding widths.
///
/// Identifiers order numerically, which is the order the database is sorted in.
///
/// ## Example
///
/// ```rust
/// use crashlabel_core::types::AddressId;
///
/// let id: AddressId = "12345".parse().unwrap();
/// assert_eq!(id, AddressId::new(12345));
/// assert!(id < AddressId::new(12346));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressId(u64);

impl AddressId
{
    /// Create a new identifier from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        AddressId(value)
    }

    /// Get the raw `u64` value of this identifier
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Parse an identifier from ASCII decimal digits
    ///
    /// Returns `None` for empty input, non-digit bytes, or values that do not
    /// fit in a `u64`. Signs and surrounding whitespace are rejected.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use crashlabel_core::types::AddressId;
    ///
    /// assert_eq!(AddressId::parse_ascii(b"42"), Some(AddressId::new(42)));
    /// assert_eq!(AddressId::parse_ascii(b"+42"), None);
    /// assert_eq!(AddressId::parse_ascii(b"99999999999999999999"), None); // Overflow
    /// ```
    pub fn parse_ascii(digits: &[u8]) -> Option<Self>
    {
        if digits.is_empty() {
            return None;
        }

        digits.iter().try_fold(0u64, |acc, &byte| {
            if !byte.is_ascii_digit() {
                return None;
            }
            acc.checked_mul(10)?.checked_add(u64::from(byte - b'0'))
        })
        .map(AddressId)
    }
}

impl From<u64> for AddressId
{
    fn from(value: u64) -> Self
    {
        AddressId(value)
    }
}

impl From<AddressId> for u64
{
    fn from(id: AddressId) -> Self
    {
        id.0
    }
}

impl FromStr for AddressId
{
    type Err = ParseAddressIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        Self::parse_ascii(s.as_bytes()).ok_or_else(|| ParseAddressIdError(s.to_string()))
    }
}

impl fmt::Display for AddressId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid decimal identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address id: {0:?}")]
pub struct ParseAddressIdError(String);

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_ascii_rejects_non_digits()
    {
        assert_eq!(AddressId::parse_ascii(b""), None);
        assert_eq!(AddressId::parse_ascii(b"12a"), None);
        assert_eq!(AddressId::parse_ascii(b" 12"), None);
        assert_eq!(AddressId::parse_ascii(b"-1"), None);
    }

    #[test]
    fn test_parse_ascii_limits()
    {
        assert_eq!(AddressId::parse_ascii(b"0"), Some(AddressId::new(0)));
        assert_eq!(AddressId::parse_ascii(b"18446744073709551615"), Some(AddressId::new(u64::MAX)));
        assert_eq!(AddressId::parse_ascii(b"18446744073709551616"), None);
    }

    #[test]
    fn test_display_is_decimal()
    {
        assert_eq!(AddressId::new(12345).to_string(), "12345");
    }
}
