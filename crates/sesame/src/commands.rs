// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations. Each returns the text to print on stdout.

use sesame_config::model::SesameConfig;
use sesame_core::{AuthDrivers, AuthError, ProviderType, SigninConsumerToken};

/// Manifests of the configured drivers as pretty JSON.
pub fn drivers_json(drivers: &AuthDrivers) -> Result<String, AuthError> {
    serde_json::to_string_pretty(&drivers.manifests())
        .map_err(|e| AuthError::unknown("failed to encode driver manifests", e))
}

/// Mint a signin redirect for `provider` and render it as JSON.
pub fn signin_url(
    drivers: &AuthDrivers,
    provider: ProviderType,
    token: &SigninConsumerToken,
) -> Result<String, AuthError> {
    let driver = drivers
        .get(provider)
        .ok_or_else(|| AuthError::WrongRequest(format!("provider `{provider}` is not enabled")))?;
    let redirect = driver.signin_uri(token)?.ok_or_else(|| {
        AuthError::WrongRequest(format!("provider `{provider}` has no redirect flow"))
    })?;
    serde_json::to_string_pretty(&redirect)
        .map_err(|e| AuthError::unknown("failed to encode signin redirect", e))
}

/// One line per enabled provider with its callback URL.
pub fn config_summary(config: &SesameConfig) -> String {
    let base_url = &config.server.base_url;
    let mut out = format!("configuration OK (base_url = {base_url})\n");
    for provider in config.enabled_providers() {
        out.push_str(&format!(
            "  {provider:<7} {}\n",
            provider.callback_url(base_url)
        ));
    }
    out
}
