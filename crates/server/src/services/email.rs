//! Email delivery of verification codes.
//!
//! Uses SMTP via lettre for delivery with Askama HTML and plain text templates.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;

use bakehouse_core::{DisplayName, Email, OTP_TTL_MINUTES, OtpCode};

use super::notifier::{NotifyError, OtpNotifier};
use crate::config::EmailConfig;

/// HTML template for the verification code email.
#[derive(Template)]
#[template(path = "email/otp_code.html")]
struct OtpCodeEmailHtml<'a> {
    store_name: &'a str,
    name: &'a str,
    code: &'a str,
    ttl_minutes: i64,
}

/// Plain text template for the verification code email.
#[derive(Template)]
#[template(path = "email/otp_code.txt")]
struct OtpCodeEmailText<'a> {
    store_name: &'a str,
    name: &'a str,
    code: &'a str,
    ttl_minutes: i64,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    store_name: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be set up.
    pub fn new(config: &EmailConfig, store_name: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            store_name: store_name.to_owned(),
        })
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl OtpNotifier for EmailService {
    async fn send_otp(
        &self,
        to: &Email,
        name: &DisplayName,
        code: &OtpCode,
    ) -> Result<(), NotifyError> {
        let html = OtpCodeEmailHtml {
            store_name: &self.store_name,
            name: name.as_str(),
            code: code.as_str(),
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()?;
        let text = OtpCodeEmailText {
            store_name: &self.store_name,
            name: name.as_str(),
            code: code.as_str(),
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()?;

        let subject = format!("Verify your {} account", self.store_name);
        self.send_multipart_email(to.as_str(), &subject, &text, &html)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_template_mentions_code_and_expiry() {
        let body = OtpCodeEmailText {
            store_name: "Shree Krishna Bakers",
            name: "Asha",
            code: "048213",
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()
        .unwrap();

        assert!(body.contains("048213"));
        assert!(body.contains("10 minutes"));
        assert!(body.contains("Asha"));
    }

    #[test]
    fn test_html_template_escapes_name() {
        let body = OtpCodeEmailHtml {
            store_name: "Shree Krishna Bakers",
            name: "<b>Asha</b>",
            code: "048213",
            ttl_minutes: OTP_TTL_MINUTES,
        }
        .render()
        .unwrap();

        assert!(body.contains("048213"));
        assert!(!body.contains("<b>Asha</b>"));
    }
}
