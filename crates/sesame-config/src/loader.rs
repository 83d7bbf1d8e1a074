// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sesame.toml` > `~/.config/sesame/sesame.toml` > `/etc/sesame/sesame.toml`
//! with environment variable overrides via `SESAME_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SesameConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/sesame/sesame.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sesame.toml";

/// Top-level sections, used to map `SESAME_<SECTION>_<KEY>` env vars.
const SECTIONS: [&str; 8] = [
    "server", "state", "session", "http", "local", "github", "gitlab", "oidc",
];

/// `~/.config/sesame/sesame.toml`, when a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sesame/sesame.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sesame/sesame.toml` (system-wide)
/// 3. `~/.config/sesame/sesame.toml` (user XDG config)
/// 4. `./sesame.toml` (local directory)
/// 5. `SESAME_*` environment variables
pub fn load_config() -> Result<SesameConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SesameConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SesameConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SesameConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SesameConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for standard config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SesameConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `SESAME_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `SESAME_GITHUB_CLIENT_SECRET` maps to `github.client_secret`. Variables
/// naming no known section are ignored.
fn env_provider() -> Env {
    Env::prefixed("SESAME_")
        .filter(|key| env_key_to_path(&key.as_str().to_ascii_lowercase()).is_some())
        .map(|key| {
            env_key_to_path(&key.as_str().to_ascii_lowercase())
                .unwrap_or_default()
                .into()
        })
}

pub(crate) fn env_key_to_path(key: &str) -> Option<String> {
    SECTIONS.iter().find_map(|section| {
        key.strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|rest| !rest.is_empty())
            .map(|rest| format!("{section}.{rest}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        for (key, path) in [
            ("github_client_secret", "github.client_secret"),
            ("state_signing_key", "state.signing_key"),
            ("http_timeout_secs", "http.timeout_secs"),
            ("local_allowed_domains", "local.allowed_domains"),
            ("server_base_url", "server.base_url"),
        ] {
            assert_eq!(env_key_to_path(key).as_deref(), Some(path));
        }
    }

    #[test]
    fn unknown_env_keys_are_ignored() {
        assert_eq!(env_key_to_path("unrelated"), None);
        assert_eq!(env_key_to_path("stateful"), None);
        assert_eq!(env_key_to_path("github_"), None);
    }
}
