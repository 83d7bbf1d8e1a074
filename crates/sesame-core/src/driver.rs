// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manifest wrapper around a concrete [`Driver`].
//!
//! [`AuthDriver`] adds the provider metadata the caller needs (type tag,
//! signup policy), a fixed session lifetime, and the optional organization
//! tag stamped onto every identity the driver returns.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::AuthError;
use crate::traits::{AccountFlows, Driver};
use crate::types::{
    AuthDriverManifest, ProviderType, SigninConsumerToken, SigninRedirect, SigninRequest,
    UserInfo,
};

/// Session lifetime granted to users of a driver unless configured otherwise.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Outcome of a full callback round: the identity plus the verified signin intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub user: UserInfo,
    /// `None` for drivers without state tokens (local).
    pub state: Option<SigninConsumerToken>,
}

/// A configured driver plus its manifest.
#[derive(Clone)]
pub struct AuthDriver {
    manifest: AuthDriverManifest,
    session_duration: Duration,
    organization: Option<String>,
    driver: Arc<dyn Driver>,
}

impl std::fmt::Debug for AuthDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthDriver")
            .field("manifest", &self.manifest)
            .field("session_duration", &self.session_duration)
            .field("organization", &self.organization)
            .field("redirectable", &self.driver.as_redirectable().is_some())
            .field("state_verifiable", &self.driver.as_state_verifiable().is_some())
            .field("account_flows", &self.driver.as_account_flows().is_some())
            .finish()
    }
}

impl AuthDriver {
    pub fn new(provider_type: ProviderType, signup_disabled: bool, driver: impl Driver) -> Self {
        Self::from_arc(provider_type, signup_disabled, Arc::new(driver))
    }

    pub fn from_arc(
        provider_type: ProviderType,
        signup_disabled: bool,
        driver: Arc<dyn Driver>,
    ) -> Self {
        Self {
            manifest: AuthDriverManifest {
                provider_type,
                signup_disabled,
            },
            session_duration: DEFAULT_SESSION_DURATION,
            organization: None,
            driver,
        }
    }

    pub fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    /// Tag every identity from this driver with the given organization.
    ///
    /// An empty string leaves identities untagged.
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        let organization = organization.into();
        self.organization = (!organization.is_empty()).then_some(organization);
        self
    }

    pub fn manifest(&self) -> AuthDriverManifest {
        self.manifest
    }

    pub fn provider_type(&self) -> ProviderType {
        self.manifest.provider_type
    }

    pub fn session_duration(&self) -> Duration {
        self.session_duration
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    /// The wrapped driver, for capability queries.
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Fails with [`AuthError::SignupDisabled`] when the manifest forbids new accounts.
    pub fn ensure_signup_allowed(&self) -> Result<(), AuthError> {
        if self.manifest.signup_disabled {
            return Err(AuthError::SignupDisabled);
        }
        Ok(())
    }

    /// Signup, verify and reset checks, or `None` for drivers backed by a remote provider.
    pub fn account_flows(&self) -> Option<&dyn AccountFlows> {
        self.driver.as_account_flows()
    }

    /// Gate and shape-check a signup request.
    ///
    /// Fails with [`AuthError::SignupDisabled`] before looking at the request,
    /// and with [`AuthError::WrongRequest`] when the driver has no signup flow.
    pub fn check_signup_request(&self, req: &SigninRequest) -> Result<(), AuthError> {
        self.ensure_signup_allowed()?;
        let flows = self.account_flows().ok_or_else(|| {
            AuthError::WrongRequest(format!(
                "provider `{}` does not support signup",
                self.provider_type()
            ))
        })?;
        flows.check_signup_request(req)
    }

    /// Build the provider redirect, or `None` when the driver has no redirect flow.
    pub fn signin_uri(
        &self,
        token: &SigninConsumerToken,
    ) -> Result<Option<SigninRedirect>, AuthError> {
        match self.driver.as_redirectable() {
            Some(redirectable) => redirectable.signin_uri(token).map(Some),
            None => Ok(None),
        }
    }

    pub fn check_signin_request(&self, req: &SigninRequest) -> Result<(), AuthError> {
        self.driver.check_signin_request(req)
    }

    /// Verify the callback's state token, or `None` when the driver issues none.
    pub fn check_signin_state_token(
        &self,
        req: &SigninRequest,
    ) -> Result<Option<SigninConsumerToken>, AuthError> {
        match self.driver.as_state_verifiable() {
            Some(verifiable) => verifiable.check_signin_state_token(req).map(Some),
            None => Ok(None),
        }
    }

    /// Fetch the identity from the driver and apply the organization tag.
    pub async fn user_info(&self, req: &SigninRequest) -> Result<UserInfo, AuthError> {
        let mut info = self.driver.user_info_from_driver(req).await?;
        if let Some(org) = &self.organization {
            info.organization = org.clone();
        }
        Ok(info)
    }

    /// Run request validation, state verification, and identity fetch in order.
    ///
    /// Each step stays callable on its own; this only chains them.
    pub async fn authenticate(&self, req: &SigninRequest) -> Result<Authenticated, AuthError> {
        let provider = self.provider_type();
        self.check_signin_request(req).inspect_err(|e| {
            warn!(%provider, error = %e, "signin request rejected");
        })?;
        let state = self.check_signin_state_token(req).inspect_err(|e| {
            warn!(%provider, error = %e, "signin state rejected");
        })?;
        let user = self.user_info(req).await?;
        debug!(%provider, username = %user.username, "signin completed");
        Ok(Authenticated { user, state })
    }
}
