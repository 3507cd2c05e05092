//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// Not exactly ten digits.
    #[error("phone number must be exactly {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// Contains something other than ASCII digits.
    #[error("phone number must contain digits only")]
    NonDigit,
    /// Does not start with a mobile prefix (6, 7, 8 or 9).
    #[error("invalid Indian phone number")]
    InvalidPrefix,
}

/// An Indian mobile number: ten digits starting with 6, 7, 8 or 9.
///
/// ```
/// use bakehouse_core::Phone;
///
/// assert!(Phone::parse("9876543210").is_ok());
/// assert!(Phone::parse("5876543210").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Number of digits in a mobile number.
    pub const DIGITS: usize = 10;

    /// Parse a `Phone` from a string, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not ten ASCII digits or does not
    /// start with 6-9.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();

        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        if s.len() != Self::DIGITS {
            return Err(PhoneError::WrongLength {
                expected: Self::DIGITS,
            });
        }

        if !matches!(s.as_bytes().first(), Some(b'6'..=b'9')) {
            return Err(PhoneError::InvalidPrefix);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap a value read back from storage without re-validating it.
    #[must_use]
    pub const fn from_trusted(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Phone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        for number in ["9876543210", "6000000000", "7123456789", "8999999999"] {
            assert_eq!(Phone::parse(number).unwrap().as_str(), number);
        }
        assert_eq!(Phone::parse(" 9876543210 ").unwrap().as_str(), "9876543210");
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(
            Phone::parse("987654321"),
            Err(PhoneError::WrongLength { expected: 10 })
        );
        assert_eq!(
            Phone::parse("98765432100"),
            Err(PhoneError::WrongLength { expected: 10 })
        );
        assert_eq!(
            Phone::parse(""),
            Err(PhoneError::WrongLength { expected: 10 })
        );
    }

    #[test]
    fn test_parse_non_digit() {
        assert_eq!(Phone::parse("+919876543210"), Err(PhoneError::NonDigit));
        assert_eq!(Phone::parse("98765-43210"), Err(PhoneError::NonDigit));
    }

    #[test]
    fn test_parse_invalid_prefix() {
        assert_eq!(Phone::parse("0123456789"), Err(PhoneError::InvalidPrefix));
        assert_eq!(Phone::parse("5876543210"), Err(PhoneError::InvalidPrefix));
    }
}
