// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Driver trait and the optional capability traits layered on top of it.

use async_trait::async_trait;

use crate::error::AuthError;
use crate::types::{SigninConsumerToken, SigninRedirect, SigninRequest, UserInfo};

/// The capability every identity provider must implement.
///
/// Drivers are immutable after construction and are shared across concurrent
/// requests. Outbound calls are cancelled by dropping the returned future.
///
/// Optional capabilities are discovered through [`as_redirectable`](Self::as_redirectable),
/// [`as_state_verifiable`](Self::as_state_verifiable) and
/// [`as_account_flows`](Self::as_account_flows); callers never switch on the
/// provider type.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Exchange a completed signin request for a normalized identity.
    async fn user_info_from_driver(&self, req: &SigninRequest) -> Result<UserInfo, AuthError>;

    /// Validate the shape of a signin request before any network call.
    fn check_signin_request(&self, _req: &SigninRequest) -> Result<(), AuthError> {
        Ok(())
    }

    /// Returns the redirect capability, if this driver drives a browser redirect flow.
    fn as_redirectable(&self) -> Option<&dyn Redirectable> {
        None
    }

    /// Returns the state-verification capability, if this driver issues state tokens.
    fn as_state_verifiable(&self) -> Option<&dyn StateVerifiable> {
        None
    }

    /// Returns the account-management checks, if this driver owns its accounts.
    fn as_account_flows(&self) -> Option<&dyn AccountFlows> {
        None
    }
}

/// A driver that can send the user to the provider's authorization page.
pub trait Redirectable: Send + Sync {
    /// Build the provider redirect, embedding a freshly signed state token.
    fn signin_uri(&self, token: &SigninConsumerToken) -> Result<SigninRedirect, AuthError>;
}

/// A driver whose callbacks carry a signed anti-CSRF `state` field.
pub trait StateVerifiable: Send + Sync {
    /// Verify the callback's `state` field and return the embedded signin intent.
    fn check_signin_state_token(
        &self,
        req: &SigninRequest,
    ) -> Result<SigninConsumerToken, AuthError>;
}

/// Request checks for drivers whose accounts are stored by the caller:
/// signup, email verification, and the two password reset steps.
pub trait AccountFlows: Send + Sync {
    fn check_signup_request(&self, req: &SigninRequest) -> Result<(), AuthError>;

    fn check_verify_request(&self, req: &SigninRequest) -> Result<(), AuthError>;

    /// First reset step: the user asks for a reset link.
    fn check_ask_reset_request(&self, req: &SigninRequest) -> Result<(), AuthError>;

    /// Second reset step: the user submits the token and a new password.
    fn check_reset_request(&self, req: &SigninRequest) -> Result<(), AuthError>;
}
