//! Signup, email verification and sign-in.
//!
//! A signup is written straight away as an unverified account holding a
//! one-time code. The code is mailed out; echoing it back before it expires
//! verifies the account, and only verified accounts can sign in.

mod error;
mod password;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, DEFAULT_TOKEN_TTL_HOURS, IssuedToken, SessionIssuer, TokenError};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use bakehouse_core::{DisplayName, Email, PendingOtp, Phone, validate_password};

use crate::db::{OtpAttempt, RepositoryError, UserStore};
use crate::models::{PendingRegistration, User};
use crate::services::notifier::OtpNotifier;

/// Signup form as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// A signup waiting for its code.
#[derive(Debug, Clone)]
pub struct PendingSignup {
    pub email: Email,
    pub expires_at: DateTime<Utc>,
}

/// A successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: IssuedToken,
    pub user: User,
}

/// Authentication service.
///
/// Handles registration with emailed one-time codes and password sign-in.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    notifier: &'a dyn OtpNotifier,
    sessions: &'a SessionIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        notifier: &'a dyn OtpNotifier,
        sessions: &'a SessionIssuer,
    ) -> Self {
        Self {
            users,
            notifier,
            sessions,
        }
    }

    /// Start a signup: store an unverified account with a fresh code and
    /// mail the code.
    ///
    /// An existing unverified account for the email is overwritten in place.
    /// If the code cannot be delivered the account is removed again.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad fields (checked in the order name,
    /// email, password, phone), `AuthError::AlreadyRegistered` if a verified
    /// account uses the email, and `AuthError::DeliveryFailed` if mailing the
    /// code fails.
    pub async fn request_registration(
        &self,
        signup: &Signup,
        now: DateTime<Utc>,
    ) -> Result<PendingSignup, AuthError> {
        let name = DisplayName::parse(&signup.name)?;
        let email = Email::parse(&signup.email)?;
        validate_password(&signup.password)?;
        let phone = Phone::parse(&signup.phone)?;

        // Skip the hashing work for an address that is already taken. The
        // upsert below re-checks this in the same statement as the write.
        if self
            .users
            .get_by_email(&email)
            .await?
            .is_some_and(|user| user.is_verified())
        {
            return Err(AuthError::AlreadyRegistered);
        }

        let registration = PendingRegistration {
            name,
            email,
            phone,
            password_hash: password::hash_password(&signup.password)?,
            otp: PendingOtp::issue(now),
        };

        let user = self
            .users
            .upsert_pending(&registration)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AlreadyRegistered,
                other => AuthError::Repository(other),
            })?;
        tracing::info!(user_id = %user.id, email = %user.email, "Registration requested");

        let PendingRegistration { name, email, otp, .. } = registration;
        if let Err(e) = self.notifier.send_otp(&email, &name, &otp.code).await {
            tracing::error!(email = %email, error = %e, "Verification code delivery failed");
            match self.users.discard_pending(&email, &otp.code).await {
                Ok(removed) => {
                    tracing::info!(email = %email, removed, "Pending signup rolled back");
                }
                Err(rollback) => {
                    tracing::error!(email = %email, error = %rollback, "Pending signup rollback failed");
                }
            }
            return Err(AuthError::DeliveryFailed(e));
        }
        tracing::info!(email = %email, expires_at = %otp.expires_at, "Verification code sent");

        Ok(PendingSignup {
            email,
            expires_at: otp.expires_at,
        })
    }

    /// Verify an account with the code it was sent.
    ///
    /// An expired code is cleared, so the applicant has to sign up again.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SignupNotFound` if no account uses the email and
    /// `AuthError::Otp` when the code is not accepted.
    pub async fn verify(
        &self,
        email: &str,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        match self.users.consume_otp(&email, submitted, now).await? {
            OtpAttempt::Verified(user) => {
                tracing::info!(user_id = %user.id, email = %email, "Account verified");
                Ok(user)
            }
            OtpAttempt::UnknownEmail => {
                tracing::info!(email = %email, "Verification for unknown email");
                Err(AuthError::SignupNotFound)
            }
            OtpAttempt::Rejected(reason) => {
                tracing::info!(email = %email, reason = %reason, "Verification rejected");
                Err(reason.into())
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// Unknown emails, unverified accounts and wrong passwords all fail the
    /// same way and take about as long.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed email and
    /// `AuthError::InvalidCredentials` otherwise.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedIn, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = match self.users.get_with_password_hash(&email).await? {
            Some((user, hash)) if user.is_verified() => (user, hash),
            found => {
                password::equalize_timing(password);
                tracing::info!(
                    email = %email,
                    account_exists = found.is_some(),
                    "Sign-in rejected"
                );
                return Err(AuthError::InvalidCredentials);
            }
        };

        if let Err(e) = password::verify_password(password, &password_hash) {
            tracing::info!(user_id = %user.id, "Sign-in rejected: wrong password");
            return Err(e);
        }

        let token = self.sessions.issue(user.id, user.role, now)?;
        tracing::info!(user_id = %user.id, role = %user.role, "Signed in");

        Ok(SignedIn { token, user })
    }
}
