//! Bakehouse Core - Shared domain types and rules.
//!
//! This crate provides the types used across all Bakehouse components:
//! - `server` - The ordering API (customer menu/checkout and admin dashboard)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. Storage and transport live in the server crate, which
//! calls into these rules so that every backend enforces the same invariants.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, phones, money, and statuses
//! - [`otp`] - One-time verification codes and the verification decision
//! - [`order`] - Line items and order placement validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod order;
pub mod otp;
pub mod types;

pub use order::{LineItem, NewOrder, OrderValidationError};
pub use otp::{OTP_TTL_MINUTES, OtpCode, OtpCodeError, OtpError, PendingOtp, VerificationState};
pub use types::*;
