//! One-time verification codes for account activation.
//!
//! A signup stores an unverified account together with a [`PendingOtp`]. The
//! code is mailed to the applicant, who proves control of the address by
//! echoing it back before it expires. The decision of whether a submitted code
//! is accepted lives here so every storage backend applies the same rules in
//! the same order.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

/// How long an issued code stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Number of digits in a code.
pub const OTP_DIGITS: usize = 6;

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("OTP must be exactly {OTP_DIGITS} digits")]
pub struct OtpCodeError;

/// A six-digit numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Draw a fresh code uniformly from the one million values `000000`-`999999`.
    #[must_use]
    pub fn generate() -> Self {
        let value: u32 = rand::rng().random_range(0..1_000_000);
        Self(format!("{value:06}"))
    }

    /// Parse a code.
    ///
    /// # Errors
    ///
    /// Returns [`OtpCodeError`] unless the input is exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpCodeError> {
        if s.len() == OTP_DIGITS && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(OtpCodeError)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a submitted code was not accepted.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpError {
    #[error("email already verified")]
    AlreadyVerified,
    #[error("no pending verification code")]
    NoPendingCode,
    #[error("verification code has expired")]
    Expired,
    #[error("invalid verification code")]
    Mismatch,
}

/// An issued code and the instant after which it is no longer accepted.
///
/// Code and expiry only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOtp {
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
}

impl PendingOtp {
    /// Issue a new random code valid for [`OTP_TTL_MINUTES`] from `now`.
    #[must_use]
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self::with_code(OtpCode::generate(), now)
    }

    /// Issue a specific code valid for [`OTP_TTL_MINUTES`] from `now`.
    #[must_use]
    pub fn with_code(code: OtpCode, now: DateTime<Utc>) -> Self {
        Self {
            code,
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
        }
    }

    /// Whether `now` is past the expiry instant. The expiry instant itself is
    /// still valid.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Check a submitted code. Expiry is checked before the code itself.
    ///
    /// # Errors
    ///
    /// Returns [`OtpError::Expired`] or [`OtpError::Mismatch`].
    pub fn check(&self, submitted: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        if self.is_expired(now) {
            return Err(OtpError::Expired);
        }
        if self.code.as_str() != submitted {
            return Err(OtpError::Mismatch);
        }
        Ok(())
    }
}

/// Verification state of an account, as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationState {
    /// The address has been proven; no code is held.
    Verified,
    /// Unverified, with a live (or lapsed but not yet cleared) code.
    Pending(PendingOtp),
    /// Unverified, and the code was cleared after it expired.
    Cleared,
}

impl VerificationState {
    /// Rebuild the state from the three stored columns.
    ///
    /// Returns `None` when the columns break the storage invariants: only one
    /// of code/expiry set, or a verified account still holding a code.
    #[must_use]
    pub fn from_columns(
        is_verified: bool,
        otp_code: Option<String>,
        otp_expires_at: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        match (is_verified, otp_code, otp_expires_at) {
            (true, None, None) => Some(Self::Verified),
            (false, Some(code), Some(expires_at)) => Some(Self::Pending(PendingOtp {
                code: OtpCode::parse(&code).ok()?,
                expires_at,
            })),
            (false, None, None) => Some(Self::Cleared),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }

    /// The pending code, if one is held.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingOtp> {
        match self {
            Self::Pending(pending) => Some(pending),
            Self::Verified | Self::Cleared => None,
        }
    }

    /// Decide whether `submitted` activates the account at `now`.
    ///
    /// Checks run in a fixed order: already verified, no code held, expired,
    /// wrong code.
    ///
    /// # Errors
    ///
    /// Returns the first [`OtpError`] that applies.
    pub fn check(&self, submitted: &str, now: DateTime<Utc>) -> Result<(), OtpError> {
        match self {
            Self::Verified => Err(OtpError::AlreadyVerified),
            Self::Cleared => Err(OtpError::NoPendingCode),
            Self::Pending(pending) => pending.check(submitted, now),
        }
    }
}
