//! Account management commands.
//!
//! ```bash
//! bh-cli user set-role -e owner@example.com -r admin
//! ```
//!
//! Roles can only be changed on verified accounts, so a staff member signs up
//! and verifies through the app first.

use thiserror::Error;

use bakehouse_core::{Email, Role};
use bakehouse_server::db::{self, PgUserStore, RepositoryError, UserStore};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Missing environment variable: BAKEHOUSE_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Invalid role: {0}. Valid roles: customer, admin")]
    InvalidRole(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No verified account with email: {0}")]
    NotFound(String),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// Set the role of a verified account.
///
/// # Errors
///
/// Returns an error for a bad role or email, when no verified account uses
/// the email, or when the database is unreachable.
pub async fn set_role(email: &str, role: &str) -> Result<(), UserError> {
    let role: Role = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| UserError::InvalidEmail(e.to_string()))?;

    let database_url = super::database_url().ok_or(UserError::MissingDatabaseUrl)?;
    let pool = db::create_pool(&database_url).await?;
    let users = PgUserStore::new(pool);

    let user = users.set_role(&email, role).await.map_err(|e| match e {
        RepositoryError::NotFound => UserError::NotFound(email.to_string()),
        other => UserError::Repository(other),
    })?;

    tracing::info!(
        "Role updated! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    if role == Role::Admin {
        tracing::warn!("Tokens issued before this change keep the old role until they expire.");
    }

    Ok(())
}
