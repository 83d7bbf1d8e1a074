// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider discovery (`/.well-known/openid-configuration`) and JWKS retrieval.

use jsonwebtoken::jwk::JwkSet;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use sesame_core::AuthError;

/// The subset of the discovery document the driver relies on.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default)]
    pub id_token_signing_alg_values_supported: Vec<String>,
}

pub(crate) fn discovery_url(issuer: &str) -> String {
    format!(
        "{}/.well-known/openid-configuration",
        issuer.trim_end_matches('/')
    )
}

/// Fetch and sanity-check the issuer's discovery document.
pub(crate) async fn discover(
    client: &reqwest::Client,
    issuer: &str,
) -> Result<ProviderMetadata, AuthError> {
    let metadata: ProviderMetadata = get_json(client, &discovery_url(issuer), "discovery").await?;
    if metadata.issuer.trim_end_matches('/') != issuer.trim_end_matches('/') {
        return Err(AuthError::Config(format!(
            "oidc discovery issuer `{}` does not match configured issuer `{issuer}`",
            metadata.issuer
        )));
    }
    Ok(metadata)
}

pub(crate) async fn fetch_jwks(client: &reqwest::Client, jwks_uri: &str) -> Result<JwkSet, AuthError> {
    let jwks: JwkSet = get_json(client, jwks_uri, "jwks").await?;
    debug!(keys = jwks.keys.len(), "fetched oidc signing keys");
    Ok(jwks)
}

async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    what: &str,
) -> Result<T, AuthError> {
    debug!(url, "fetching oidc {what}");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AuthError::unknown(format!("oidc {what} request failed: {e}"), e))?;
    sesame_http::read_json(response, &format!("oidc {what}")).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_url_handles_trailing_slash() {
        assert_eq!(
            discovery_url("https://id.example.com/realms/main/"),
            "https://id.example.com/realms/main/.well-known/openid-configuration"
        );
    }

    #[test]
    fn metadata_ignores_unknown_fields() {
        let doc = r#"{
            "issuer": "https://id.example.com",
            "authorization_endpoint": "https://id.example.com/auth",
            "token_endpoint": "https://id.example.com/token",
            "jwks_uri": "https://id.example.com/keys",
            "response_types_supported": ["code"]
        }"#;
        let metadata: ProviderMetadata = serde_json::from_str(doc).unwrap();
        assert_eq!(metadata.token_endpoint, "https://id.example.com/token");
        assert!(metadata.userinfo_endpoint.is_none());
    }
}
