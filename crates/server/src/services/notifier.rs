//! Out-of-band delivery of one-time codes.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use lettre::transport::smtp::Error as SmtpError;
use thiserror::Error;
use tokio::sync::Mutex;

use bakehouse_core::{DisplayName, Email, OtpCode};

/// Errors that can occur when delivering a code.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The transport refused the message.
    #[error("delivery refused: {0}")]
    Refused(String),
}

/// Sends a verification code to an applicant.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn send_otp(
        &self,
        to: &Email,
        name: &DisplayName,
        code: &OtpCode,
    ) -> Result<(), NotifyError>;
}

/// Writes codes to the log instead of mailing them.
///
/// Only wired up in development when SMTP is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl OtpNotifier for LogNotifier {
    async fn send_otp(
        &self,
        to: &Email,
        _name: &DisplayName,
        code: &OtpCode,
    ) -> Result<(), NotifyError> {
        tracing::warn!(to = %to, code = %code, "SMTP not configured; verification code logged");
        Ok(())
    }
}

/// A code handed to [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentOtp {
    pub to: Email,
    pub code: OtpCode,
}

/// Keeps every code it is asked to send, for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentOtp>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// The most recent code sent to `to`.
    pub async fn last_code_for(&self, to: &Email) -> Option<OtpCode> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|sent| &sent.to == to)
            .map(|sent| sent.code.clone())
    }

    /// Every delivery so far, oldest first.
    pub async fn sent(&self) -> Vec<SentOtp> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl OtpNotifier for RecordingNotifier {
    async fn send_otp(
        &self,
        to: &Email,
        _name: &DisplayName,
        code: &OtpCode,
    ) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Refused("recording notifier set to fail".to_owned()));
        }
        self.sent.lock().await.push(SentOtp {
            to: to.clone(),
            code: code.clone(),
        });
        Ok(())
    }
}
