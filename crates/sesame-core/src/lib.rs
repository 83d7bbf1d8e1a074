// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Sesame authentication drivers.
//!
//! This crate provides the driver trait family, the provider-agnostic request
//! and identity types, the error taxonomy, and the [`AuthDriver`] wrapper and
//! [`AuthDrivers`] registry the HTTP layer talks to. Concrete drivers live in
//! their own crates and implement the traits defined here.

pub mod driver;
pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use driver::{Authenticated, AuthDriver, DEFAULT_SESSION_DURATION};
pub use error::{AuthError, ErrorKind};
pub use registry::AuthDrivers;
pub use types::{
    AuthDriverManifest, AuthDriverManifests, ProviderType, SigninConsumerToken, SigninRedirect,
    SigninRequest, UserInfo,
};

pub use traits::{AccountFlows, Driver, Redirectable, StateVerifiable};
