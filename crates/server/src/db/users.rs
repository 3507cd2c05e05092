//! `PostgreSQL` account storage.
//!
//! Every mutation of the one-time code is a single conditional statement
//! keyed by email, so concurrent signups and verifications for the same
//! address cannot interleave between a read and a write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bakehouse_core::{DisplayName, Email, OtpCode, OtpError, Phone, Role, UserId, VerificationState};

use super::{OtpAttempt, RepositoryError, UserStore};
use crate::models::{PendingRegistration, User};

/// Attempts at the conditional verify before giving up on a row that keeps
/// changing underneath it.
const MAX_VERIFY_ATTEMPTS: usize = 3;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    phone: String,
    role: String,
    is_verified: bool,
    otp_code: Option<String>,
    otp_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = Phone::parse(&row.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone for user {}: {e}", row.id))
        })?;
        let name = DisplayName::parse(&row.name).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid name for user {}: {e}", row.id))
        })?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(RepositoryError::DataCorruption)?;
        let verification =
            VerificationState::from_columns(row.is_verified, row.otp_code, row.otp_expires_at)
                .ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "inconsistent verification columns for user {}",
                        row.id
                    ))
                })?;

        Ok(Self {
            id: UserId::new(row.id),
            name,
            email,
            phone,
            role,
            verification,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Account storage backed by the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clear a lapsed code, unless the row has since been given a new one.
    async fn clear_expired(&self, email: &Email, code: &OtpCode) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE users
            SET otp_code = NULL, otp_expires_at = NULL, updated_at = NOW()
            WHERE email = $1 AND is_verified = FALSE AND otp_code = $2
            ",
        )
        .bind(email)
        .bind(code.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, phone, role, is_verified, otp_code, otp_expires_at,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, name, email, phone, role, is_verified, otp_code, otp_expires_at,
                   created_at, updated_at, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    async fn upsert_pending(
        &self,
        registration: &PendingRegistration,
    ) -> Result<User, RepositoryError> {
        // A verified row makes the DO UPDATE a no-op, so nothing is returned.
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, email, phone, password_hash, otp_code, otp_expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                password_hash = EXCLUDED.password_hash,
                otp_code = EXCLUDED.otp_code,
                otp_expires_at = EXCLUDED.otp_expires_at,
                updated_at = NOW()
            WHERE users.is_verified = FALSE
            RETURNING id, name, email, phone, role, is_verified, otp_code, otp_expires_at,
                      created_at, updated_at
            ",
        )
        .bind(registration.name.as_str())
        .bind(&registration.email)
        .bind(registration.phone.as_str())
        .bind(&registration.password_hash)
        .bind(registration.otp.code.as_str())
        .bind(registration.otp.expires_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| RepositoryError::Conflict("email already registered".to_owned()))?
            .try_into()
    }

    async fn discard_pending(
        &self,
        email: &Email,
        code: &OtpCode,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM users
            WHERE email = $1 AND is_verified = FALSE AND otp_code = $2
            ",
        )
        .bind(email)
        .bind(code.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn consume_otp(
        &self,
        email: &Email,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<OtpAttempt, RepositoryError> {
        for _ in 0..MAX_VERIFY_ATTEMPTS {
            let verified = sqlx::query_as::<_, UserRow>(
                r"
                UPDATE users
                SET is_verified = TRUE, otp_code = NULL, otp_expires_at = NULL, updated_at = NOW()
                WHERE email = $1
                  AND is_verified = FALSE
                  AND otp_code = $2
                  AND otp_expires_at >= $3
                RETURNING id, name, email, phone, role, is_verified, otp_code, otp_expires_at,
                          created_at, updated_at
                ",
            )
            .bind(email)
            .bind(submitted)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = verified {
                return Ok(OtpAttempt::Verified(row.try_into()?));
            }

            // Nothing matched: read the row back to say why.
            let Some(user) = self.get_by_email(email).await? else {
                return Ok(OtpAttempt::UnknownEmail);
            };

            match user.verification.check(submitted, now) {
                Err(OtpError::Expired) => {
                    if let Some(pending) = user.verification.pending() {
                        self.clear_expired(email, &pending.code).await?;
                    }
                    return Ok(OtpAttempt::Rejected(OtpError::Expired));
                }
                Err(e) => return Ok(OtpAttempt::Rejected(e)),
                // The row changed between the update and the read; try again.
                Ok(()) => {}
            }
        }

        tracing::warn!(email = %email, "verification kept racing with a concurrent signup");
        Ok(OtpAttempt::Rejected(OtpError::Mismatch))
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE email = $1 AND is_verified = TRUE
            RETURNING id, name, email, phone, role, is_verified, otp_code, otp_expires_at,
                      created_at, updated_at
            ",
        )
        .bind(email)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }
}
