// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenID Connect driver for Sesame.
//!
//! [`OidcDriver::new`] performs discovery against the issuer and fetches its
//! JWKS once; a driver that cannot reach its issuer fails to construct. At
//! callback time the driver exchanges the authorization code, verifies the
//! returned `id_token` against the discovered keys, and maps its claims onto a
//! [`sesame_core::UserInfo`].

pub mod claims;
pub mod discovery;
pub mod driver;

pub use discovery::ProviderMetadata;
pub use driver::{OidcConfig, OidcDriver};
