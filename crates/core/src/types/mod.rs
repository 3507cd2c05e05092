//! Core types for Bakehouse.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod phone;
pub mod profile;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{AmountError, ensure_positive};
pub use phone::{Phone, PhoneError};
pub use profile::{DisplayName, NameError, PasswordPolicyError, validate_password};
pub use status::*;
