// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the driver registry from a validated configuration.

use secrecy::{ExposeSecret, SecretString};
use sesame_config::model::SesameConfig;
use sesame_core::{AuthDriver, AuthDrivers, AuthError, ProviderType};
use sesame_github::{GithubConfig, GithubDriver};
use sesame_gitlab::{GitlabConfig, GitlabDriver};
use sesame_local::{LocalConfig, LocalDriver};
use sesame_oidc::{OidcConfig, OidcDriver};
use sesame_state::SigninStateCodec;
use tracing::info;

/// Construct every enabled driver.
///
/// OIDC discovery happens here, so an unreachable issuer fails the whole build.
pub async fn build_drivers(config: &SesameConfig) -> Result<AuthDrivers, AuthError> {
    let codec = state_codec(config)?;
    let base_url = config.server.base_url.as_str();
    let timeout = config.http.timeout();
    let mut drivers = AuthDrivers::new();

    let local = &config.local;
    if local.enabled {
        let driver = LocalDriver::new(LocalConfig {
            allowed_domains: local.allowed_domains.clone(),
        });
        drivers.register(wrap(
            config,
            ProviderType::Local,
            local.signup_disabled,
            &local.organization,
            driver,
        ));
    }

    let github = &config.github;
    if github.enabled {
        let mut gh = GithubConfig::new(
            &github.client_id,
            owned_secret(github.client_secret.as_ref(), "github.client_secret")?,
            base_url,
        );
        gh.url = github.url.clone();
        gh.api_url = github.api_url.clone();
        gh.timeout = timeout;
        let driver = GithubDriver::new(gh, required_codec(codec.as_ref())?)?;
        drivers.register(wrap(
            config,
            ProviderType::Github,
            github.signup_disabled,
            &github.organization,
            driver,
        ));
    }

    let gitlab = &config.gitlab;
    if gitlab.enabled {
        let mut gl = GitlabConfig::new(
            &gitlab.application_id,
            owned_secret(gitlab.secret.as_ref(), "gitlab.secret")?,
            base_url,
        );
        gl.url = gitlab.url.clone();
        gl.timeout = timeout;
        let driver = GitlabDriver::new(gl, required_codec(codec.as_ref())?)?;
        drivers.register(wrap(
            config,
            ProviderType::Gitlab,
            gitlab.signup_disabled,
            &gitlab.organization,
            driver,
        ));
    }

    let oidc = &config.oidc;
    if oidc.enabled {
        let mut oc = OidcConfig::new(
            &oidc.url,
            &oidc.client_id,
            owned_secret(oidc.client_secret.as_ref(), "oidc.client_secret")?,
            base_url,
        );
        oc.timeout = timeout;
        let driver = OidcDriver::new(oc, required_codec(codec.as_ref())?).await?;
        drivers.register(wrap(
            config,
            ProviderType::Oidc,
            oidc.signup_disabled,
            &oidc.organization,
            driver,
        ));
    }

    info!(drivers = drivers.len(), "authentication drivers ready");
    Ok(drivers)
}

fn wrap(
    config: &SesameConfig,
    provider_type: ProviderType,
    signup_disabled: bool,
    organization: &str,
    driver: impl sesame_core::Driver,
) -> AuthDriver {
    AuthDriver::new(provider_type, signup_disabled, driver)
        .with_session_duration(config.session.duration())
        .with_organization(organization)
}

fn state_codec(config: &SesameConfig) -> Result<Option<SigninStateCodec>, AuthError> {
    if !config.needs_state_key() {
        return Ok(None);
    }
    let key = config
        .state
        .signing_key
        .as_ref()
        .ok_or_else(|| AuthError::Config("state.signing_key is not set".into()))?;
    SigninStateCodec::new(key, config.state.validity()).map(Some)
}

fn required_codec(codec: Option<&SigninStateCodec>) -> Result<SigninStateCodec, AuthError> {
    codec
        .cloned()
        .ok_or_else(|| AuthError::Config("state.signing_key is not set".into()))
}

fn owned_secret(secret: Option<&SecretString>, key: &str) -> Result<SecretString, AuthError> {
    secret
        .map(|s| SecretString::from(s.expose_secret().to_string()))
        .ok_or_else(|| AuthError::Config(format!("{key} is not set")))
}
