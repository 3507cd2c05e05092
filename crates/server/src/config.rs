//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAKEHOUSE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BAKEHOUSE_TOKEN_SECRET` - Session token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `BAKEHOUSE_HOST` - Bind address (default: 127.0.0.1)
//! - `BAKEHOUSE_PORT` - Listen port (default: 5001)
//! - `BAKEHOUSE_ENV` - `development` or `production` (default: development)
//! - `BAKEHOUSE_STORE_NAME` - Name used in emails (default: Shree Krishna Bakers)
//! - `BAKEHOUSE_TOKEN_TTL_HOURS` - Session token lifetime (default: 24)
//! - `BAKEHOUSE_STRICT_ORDER_LIFECYCLE` - Only allow happy-path status changes (default: false)
//! - `SMTP_HOST`, `SMTP_PORT` (default 587), `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` -
//!   Outgoing mail. Set all or none; required in production.
//! - `LOG_FORMAT` - `json` or `pretty` (default: json in production, pretty otherwise)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use bakehouse_core::TransitionPolicy;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// SMTP variables that must be set together.
const SMTP_KEYS: [&str; 4] = ["SMTP_HOST", "SMTP_USERNAME", "SMTP_PASSWORD", "SMTP_FROM"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!("expected development or production, got {other}")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: Option<&str>, environment: Environment) -> Result<Self, ConfigError> {
        match value.map(str::to_ascii_lowercase).as_deref() {
            None => Ok(match environment {
                Environment::Development => Self::Pretty,
                Environment::Production => Self::Json,
            }),
            Some("json") => Ok(Self::Json),
            Some("pretty") => Ok(Self::Pretty),
            Some(other) => Err(ConfigError::InvalidEnvVar(
                "LOG_FORMAT".to_string(),
                format!("expected json or pretty, got {other}"),
            )),
        }
    }
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Store name shown in emails
    pub store_name: String,
    /// Session token signing secret
    pub token_secret: SecretString,
    /// Session token lifetime
    pub token_ttl: Duration,
    /// How staff status changes are checked
    pub order_policy: TransitionPolicy,
    /// Outgoing mail; `None` logs codes instead (development only)
    pub email: Option<EmailConfig>,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Email (SMTP) configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BAKEHOUSE_DATABASE_URL")?;
        let host = get_env_or_default("BAKEHOUSE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BAKEHOUSE_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("BAKEHOUSE_PORT", "5001")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BAKEHOUSE_PORT".to_string(), e.to_string())
            })?;
        let environment = get_env_or_default("BAKEHOUSE_ENV", "development")
            .parse::<Environment>()
            .map_err(|e| ConfigError::InvalidEnvVar("BAKEHOUSE_ENV".to_string(), e))?;
        let store_name = get_env_or_default("BAKEHOUSE_STORE_NAME", "Shree Krishna Bakers");

        let token_secret = get_validated_secret("BAKEHOUSE_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "BAKEHOUSE_TOKEN_SECRET")?;
        let token_ttl = parse_ttl_hours(&get_env_or_default("BAKEHOUSE_TOKEN_TTL_HOURS", "24"))?;

        let strict = parse_bool(
            "BAKEHOUSE_STRICT_ORDER_LIFECYCLE",
            &get_env_or_default("BAKEHOUSE_STRICT_ORDER_LIFECYCLE", "false"),
        )?;
        let order_policy = if strict {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        };

        let email = EmailConfig::from_env()?;
        if email.is_none() && environment == Environment::Production {
            return Err(ConfigError::MissingEnvVar(SMTP_KEYS[0].to_string()));
        }

        let log_format = LogFormat::parse(get_optional_env("LOG_FORMAT").as_deref(), environment)?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            environment,
            store_name,
            token_secret,
            token_ttl,
            order_policy,
            email,
            log_format,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    /// Load SMTP settings, or `None` when no SMTP variable is set.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let present: Vec<bool> = SMTP_KEYS
            .iter()
            .map(|key| get_optional_env(key).is_some())
            .collect();
        if !smtp_required(&present)? {
            return Ok(None);
        }

        let smtp_port = get_env_or_default("SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        Ok(Some(Self {
            smtp_host: get_required_env("SMTP_HOST")?,
            smtp_port,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: get_validated_secret("SMTP_PASSWORD")?,
            from_address: get_required_env("SMTP_FROM")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Decide from which [`SMTP_KEYS`] are set whether SMTP is configured.
///
/// All set means yes, none set means no, anything else is an error naming
/// the first missing key.
fn smtp_required(present: &[bool]) -> Result<bool, ConfigError> {
    if present.iter().all(|set| !set) {
        return Ok(false);
    }
    match present.iter().position(|set| !set) {
        None => Ok(true),
        Some(missing) => Err(ConfigError::MissingEnvVar(
            SMTP_KEYS.get(missing).copied().unwrap_or("SMTP_HOST").to_string(),
        )),
    }
}

/// Parse a token lifetime in whole hours.
fn parse_ttl_hours(value: &str) -> Result<Duration, ConfigError> {
    match value.parse::<i64>() {
        Ok(hours) if (1..=24 * 365).contains(&hours) => Ok(Duration::hours(hours)),
        _ => Err(ConfigError::InvalidEnvVar(
            "BAKEHOUSE_TOKEN_TTL_HOURS".to_string(),
            format!("expected a number of hours between 1 and 8760, got {value}"),
        )),
    }
}

/// Parse a boolean flag.
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false, got {other}"),
        )),
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a token secret meets minimum length requirements.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-jwt-secret-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_token_secret_too_short() {
        let secret = SecretString::from("k8#Qz!v2");
        assert!(validate_token_secret(&secret, "BAKEHOUSE_TOKEN_SECRET").is_err());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            "Production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
        assert!(Environment::default().is_development());
    }

    #[test]
    fn test_log_format_defaults_by_environment() {
        assert_eq!(
            LogFormat::parse(None, Environment::Production).unwrap(),
            LogFormat::Json
        );
        assert_eq!(
            LogFormat::parse(None, Environment::Development).unwrap(),
            LogFormat::Pretty
        );
        assert_eq!(
            LogFormat::parse(Some("JSON"), Environment::Development).unwrap(),
            LogFormat::Json
        );
        assert!(LogFormat::parse(Some("xml"), Environment::Development).is_err());
    }

    #[test]
    fn test_smtp_all_or_nothing() {
        assert!(!smtp_required(&[false, false, false, false]).unwrap());
        assert!(smtp_required(&[true, true, true, true]).unwrap());

        let err = smtp_required(&[true, true, false, true]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "SMTP_PASSWORD"));
    }

    #[test]
    fn test_parse_ttl_hours() {
        assert_eq!(parse_ttl_hours("24").unwrap(), Duration::hours(24));
        assert!(parse_ttl_hours("0").is_err());
        assert!(parse_ttl_hours("a day").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("K", "TRUE").unwrap());
        assert!(!parse_bool("K", "0").unwrap());
        assert!(parse_bool("K", "maybe").is_err());
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_username: "orders@bakers.in".to_string(),
            smtp_password: SecretString::from("hunter2-super-private"),
            from_address: "Shree Krishna Bakers <orders@bakers.in>".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.gmail.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-super-private"));
    }
}
