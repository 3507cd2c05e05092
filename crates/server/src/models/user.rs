//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bakehouse_core::{DisplayName, Email, PendingOtp, Phone, Role, UserId, VerificationState};

/// A customer or staff account (domain type).
///
/// The password hash is deliberately absent; it is only loaded for sign-in.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: DisplayName,
    /// Normalized email address, unique across accounts.
    pub email: Email,
    /// Mobile number.
    pub phone: Phone,
    /// Account role.
    pub role: Role,
    /// Verified, or holding/cleared a one-time code.
    pub verification: VerificationState,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verification.is_verified()
    }

    /// The fields returned to a client after sign-in.
    #[must_use]
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: UserId,
    pub name: DisplayName,
    pub email: Email,
    pub role: Role,
}

/// A validated signup waiting to be written as an unverified account.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub name: DisplayName,
    pub email: Email,
    pub phone: Phone,
    /// Argon2 PHC string; never the plaintext.
    pub password_hash: String,
    pub otp: PendingOtp,
}
