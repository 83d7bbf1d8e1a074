// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: URL shapes, non-zero durations,
//! and credentials required by each enabled driver.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::diagnostic::ConfigError;
use crate::model::SesameConfig;

/// Shortest state signing key accepted, in bytes.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first.
pub fn validate_config(config: &SesameConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "server", "base_url", &config.server.base_url);
    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        errors.push(ConfigError::validation(
            "server",
            format!(
                "log_level `{}` must be one of {}",
                config.server.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    for (section, key, value) in [
        ("state", "validity_secs", config.state.validity_secs),
        ("session", "duration_secs", config.session.duration_secs),
        ("http", "timeout_secs", config.http.timeout_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(
                section,
                format!("{key} must be greater than zero"),
            ));
        }
    }

    if config.needs_state_key() {
        match &config.state.signing_key {
            None => errors.push(ConfigError::validation(
                "state",
                "signing_key is required when github, gitlab, or oidc is enabled",
            )),
            Some(key) if key.expose_secret().len() < MIN_SIGNING_KEY_LEN => {
                errors.push(ConfigError::validation(
                    "state",
                    format!("signing_key must be at least {MIN_SIGNING_KEY_LEN} bytes"),
                ))
            }
            Some(_) => {}
        }
    }

    for (i, domain) in config.local.allowed_domains.iter().enumerate() {
        let domain = domain.trim().trim_start_matches('@');
        if domain.is_empty() || domain.contains(['@', ' ']) {
            errors.push(ConfigError::validation(
                "local",
                format!("allowed_domains[{i}] `{domain}` is not a domain name"),
            ));
        }
    }

    let github = &config.github;
    if github.enabled {
        check_url(&mut errors, "github", "url", &github.url);
        check_url(&mut errors, "github", "api_url", &github.api_url);
        check_required(&mut errors, "github", "client_id", &github.client_id);
        check_secret(&mut errors, "github", "client_secret", github.client_secret.as_ref());
    }

    let gitlab = &config.gitlab;
    if gitlab.enabled {
        check_url(&mut errors, "gitlab", "url", &gitlab.url);
        check_required(&mut errors, "gitlab", "application_id", &gitlab.application_id);
        check_secret(&mut errors, "gitlab", "secret", gitlab.secret.as_ref());
    }

    let oidc = &config.oidc;
    if oidc.enabled {
        check_url(&mut errors, "oidc", "url", &oidc.url);
        check_required(&mut errors, "oidc", "client_id", &oidc.client_id);
        check_secret(&mut errors, "oidc", "client_secret", oidc.client_secret.as_ref());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ConfigError>, section: &str, key: &str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ConfigError::validation(
            section,
            format!("{key} `{value}` must use http or https, not `{}`", url.scheme()),
        )),
        Err(e) => errors.push(ConfigError::validation(
            section,
            format!("{key} `{value}` is not a valid URL: {e}"),
        )),
    }
}

fn check_required(errors: &mut Vec<ConfigError>, section: &str, key: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ConfigError::validation(section, format!("{key} must be set")));
    }
}

fn check_secret(
    errors: &mut Vec<ConfigError>,
    section: &str,
    key: &str,
    value: Option<&SecretString>,
) {
    if value.is_none() {
        errors.push(ConfigError::validation(section, format!("{key} must be set")));
    }
}
