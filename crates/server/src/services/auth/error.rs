//! Authentication error types.

use thiserror::Error;

use bakehouse_core::{EmailError, NameError, OtpError, PasswordPolicyError, PhoneError};

use super::token::TokenError;
use crate::db::RepositoryError;
use crate::services::notifier::NotifyError;

/// Errors that can occur during signup, verification and sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Name outside the allowed length.
    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),

    /// Phone number is not a valid mobile number.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] PhoneError),

    /// Password outside the allowed length.
    #[error("password validation failed: {0}")]
    WeakPassword(#[from] PasswordPolicyError),

    /// A verified account already uses this email.
    #[error("user already exists")]
    AlreadyRegistered,

    /// The one-time code could not be delivered; the pending signup was discarded.
    #[error("failed to deliver verification code: {0}")]
    DeliveryFailed(#[source] NotifyError),

    /// No account, pending or verified, exists for the email.
    #[error("no signup found for this email")]
    SignupNotFound,

    /// The submitted code was not accepted.
    #[error(transparent)]
    Otp(#[from] OtpError),

    /// Unknown email, unverified account, or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token could not be issued.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
