// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local username/password authentication for Sesame.
//!
//! The local driver never talks to a remote provider. It validates the shape
//! of signup, signin, verify, and reset requests; the caller owns the
//! credential store and uses [`password`] to hash and check secrets.

pub mod driver;
pub mod password;

pub use driver::{LocalConfig, LocalDriver, MAX_PASSWORD_LENGTH, MIN_PASSWORD_SCORE};
pub use password::{hash_password, verify_password, PasswordError};
