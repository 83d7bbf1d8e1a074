// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signin state tokens for redirect-based drivers.
//!
//! Before sending a browser to an OAuth2/OIDC provider, a driver embeds the
//! caller's [`SigninConsumerToken`] in a compact HS256 JWS and passes it as the
//! `state` parameter. When the provider redirects back, the same codec verifies
//! the signature and expiry and hands back the original intent. The signing key
//! is injected as configuration so several server instances can share it.

pub mod codec;

pub use codec::{SigninStateCodec, DEFAULT_STATE_VALIDITY, INVALID_STATE_MESSAGE};
