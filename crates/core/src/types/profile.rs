//! Registration profile fields: display name and password policy.

use core::fmt;

use serde::Serialize;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 30;

/// Password policy violations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,
}

/// Check a plaintext password against the signup policy.
///
/// # Errors
///
/// Returns an error if the password is shorter than 6 or longer than 30
/// characters.
pub fn validate_password(password: &str) -> Result<(), PasswordPolicyError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooLong);
    }
    Ok(())
}

/// Display name violations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("name too short")]
    TooShort,
    #[error("name too long")]
    TooLong,
}

/// A customer's display name (2-50 characters, trimmed).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 50;

    /// Parse a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is outside 2-50 characters.
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let s = s.trim();
        let len = s.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(NameError::TooShort);
        }
        if len > Self::MAX_LENGTH {
            return Err(NameError::TooLong);
        }
        Ok(Self(s.to_owned()))
    }

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

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
