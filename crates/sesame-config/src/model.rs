// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Sesame.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Secrets are held as [`SecretString`] and are
//! skipped when the defaults are serialized into the figment.

use std::time::Duration;

use secrecy::SecretString;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use sesame_core::ProviderType;

/// Top-level Sesame configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SesameConfig {
    /// Public URL and logging.
    #[serde(default)]
    pub server: ServerConfig,

    /// Signin state token signing.
    #[serde(default)]
    pub state: StateConfig,

    /// Session lifetime granted by every driver.
    #[serde(default)]
    pub session: SessionConfig,

    /// Outbound HTTP settings shared by provider drivers.
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub gitlab: GitlabConfig,

    #[serde(default)]
    pub oidc: OidcConfig,
}

impl SesameConfig {
    /// Provider types whose section has `enabled = true`, in provider order.
    pub fn enabled_providers(&self) -> Vec<ProviderType> {
        [
            (ProviderType::Local, self.local.enabled),
            (ProviderType::Github, self.github.enabled),
            (ProviderType::Gitlab, self.gitlab.enabled),
            (ProviderType::Oidc, self.oidc.enabled),
        ]
        .into_iter()
        .filter_map(|(provider, enabled)| enabled.then_some(provider))
        .collect()
    }

    /// Whether any enabled driver issues signin state tokens.
    pub fn needs_state_key(&self) -> bool {
        self.github.enabled || self.gitlab.enabled || self.oidc.enabled
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Public base URL; callback URLs are `<base_url>/auth/callback/<provider>`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            log_level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    /// HS256 key for state tokens. Shared by every instance behind the same base URL.
    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub signing_key: Option<SecretString>,

    #[serde(default = "default_state_validity_secs")]
    pub validity_secs: u64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            signing_key: None,
            validity_secs: default_state_validity_secs(),
        }
    }
}

impl StateConfig {
    pub fn validity(&self) -> Duration {
        Duration::from_secs(self.validity_secs)
    }
}

fn default_state_validity_secs() -> u64 {
    5 * 60
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default = "default_session_duration_secs")]
    pub duration_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_session_duration_secs(),
        }
    }
}

impl SessionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

fn default_session_duration_secs() -> u64 {
    30 * 24 * 60 * 60
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout for provider calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// `[local]` username/password driver.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub signup_disabled: bool,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub organization: String,

    /// Email domains allowed to sign up. Empty allows any domain.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            signup_disabled: false,
            organization: String::new(),
            allowed_domains: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[github]` OAuth application.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GithubConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub signup_disabled: bool,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub organization: String,

    #[serde(default = "default_github_url")]
    pub url: String,

    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub client_id: String,

    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub client_secret: Option<SecretString>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            signup_disabled: false,
            organization: String::new(),
            url: default_github_url(),
            api_url: default_github_api_url(),
            client_id: String::new(),
            client_secret: None,
        }
    }
}

fn default_github_url() -> String {
    "https://github.com".to_string()
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

/// `[gitlab]` OAuth application.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GitlabConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub signup_disabled: bool,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub organization: String,

    #[serde(default = "default_gitlab_url")]
    pub url: String,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub application_id: String,

    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub secret: Option<SecretString>,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            signup_disabled: false,
            organization: String::new(),
            url: default_gitlab_url(),
            application_id: String::new(),
            secret: None,
        }
    }
}

fn default_gitlab_url() -> String {
    "https://gitlab.com".to_string()
}

/// `[oidc]` relying party.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OidcConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub signup_disabled: bool,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub organization: String,

    /// Issuer URL used for discovery.
    #[serde(default)]
    pub url: String,

    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub client_id: String,

    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub client_secret: Option<SecretString>,
}

/// Accepts any scalar as a string.
///
/// Env values are parsed as TOML scalars, so an all-digit id or secret set
/// through `SESAME_*` arrives as an integer. Leading zeros are lost in that
/// parse; quote the value (`SESAME_X='"0123"'`) to keep them.
struct LenientString;

impl Visitor<'_> for LenientString {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

struct Lenient(String);

impl<'de> Deserialize<'de> for Lenient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LenientString).map(Lenient)
    }
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Lenient::deserialize(deserializer).map(|l| l.0)
}

/// Read an optional secret, treating an empty string as unset.
fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Lenient>::deserialize(deserializer)?;
    Ok(value
        .map(|l| l.0)
        .filter(|s| !s.is_empty())
        .map(SecretString::from))
}
