// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenID Connect authorization-code flow with id_token verification.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    ExtraTokenFields, RedirectUrl, Scope, StandardRevocableToken, StandardTokenResponse, TokenUrl,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sesame_core::{
    AuthError, Driver, ProviderType, Redirectable, SigninConsumerToken, SigninRedirect,
    SigninRequest, StateVerifiable, UserInfo,
};
use sesame_state::SigninStateCodec;

use crate::claims::{user_info_from_claims, Claims};
use crate::discovery::{self, ProviderMetadata};

const SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Signature algorithms accepted on id_tokens. Symmetric algorithms are
/// refused since the verification keys come from a public JWKS.
const ALLOWED_ALGORITHMS: [Algorithm; 9] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
    Algorithm::EdDSA,
];

/// Extra token response field carrying the id_token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdTokenFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl ExtraTokenFields for IdTokenFields {}

type OidcTokenResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;

type UnconfiguredClient = oauth2::Client<
    BasicErrorResponse,
    OidcTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
>;

/// OAuth client with authorize and token endpoints set.
type ConfiguredClient = oauth2::Client<
    BasicErrorResponse,
    OidcTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Settings for an OpenID Connect relying party.
#[derive(Debug)]
pub struct OidcConfig {
    /// Issuer URL; discovery is fetched from `<url>/.well-known/openid-configuration`.
    pub url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Public base URL of this service, used to build the callback URL.
    pub base_url: String,
    pub timeout: Duration,
}

impl OidcConfig {
    pub fn new(
        url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            client_id: client_id.into(),
            client_secret,
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Driver authenticating users against an OpenID Connect provider.
#[derive(Debug)]
pub struct OidcDriver {
    client_id: String,
    issuer: String,
    codec: SigninStateCodec,
    oauth: ConfiguredClient,
    http: reqwest::Client,
    jwks: JwkSet,
}

impl OidcDriver {
    /// Discover the provider and fetch its signing keys.
    ///
    /// Fails if the issuer is unreachable, its discovery document is malformed
    /// or names another issuer, or its JWKS cannot be fetched.
    pub async fn new(config: OidcConfig, codec: SigninStateCodec) -> Result<Self, AuthError> {
        let http = sesame_http::json_client(config.timeout)?;
        let metadata = discovery::discover(&http, &config.url).await?;
        let jwks = discovery::fetch_jwks(&http, &metadata.jwks_uri).await?;
        Self::from_parts(config, codec, http, metadata, jwks)
    }

    /// Build a driver from an already fetched discovery document and key set.
    pub fn from_discovery(
        config: OidcConfig,
        codec: SigninStateCodec,
        metadata: ProviderMetadata,
        jwks: JwkSet,
    ) -> Result<Self, AuthError> {
        let http = sesame_http::json_client(config.timeout)?;
        Self::from_parts(config, codec, http, metadata, jwks)
    }

    fn from_parts(
        config: OidcConfig,
        codec: SigninStateCodec,
        http: reqwest::Client,
        metadata: ProviderMetadata,
        jwks: JwkSet,
    ) -> Result<Self, AuthError> {
        if config.client_id.is_empty() {
            return Err(AuthError::Config("oidc client_id must be set".to_string()));
        }
        if jwks.keys.is_empty() {
            return Err(AuthError::Config(format!(
                "oidc issuer `{}` publishes no signing keys",
                metadata.issuer
            )));
        }

        let auth_url = AuthUrl::new(metadata.authorization_endpoint.clone())
            .map_err(|e| AuthError::Config(format!("invalid oidc authorization endpoint: {e}")))?;
        let token_url = TokenUrl::new(metadata.token_endpoint.clone())
            .map_err(|e| AuthError::Config(format!("invalid oidc token endpoint: {e}")))?;
        let redirect_url = RedirectUrl::new(ProviderType::Oidc.callback_url(&config.base_url))
            .map_err(|e| AuthError::Config(format!("invalid oidc callback url: {e}")))?;

        let oauth = UnconfiguredClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(
                config.client_secret.expose_secret().to_string(),
            ))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        info!(issuer = %metadata.issuer, keys = jwks.keys.len(), "oidc driver configured");

        Ok(Self {
            client_id: config.client_id,
            issuer: metadata.issuer,
            codec,
            oauth,
            http,
            jwks,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    fn signing_key(&self, kid: Option<&str>) -> Option<&Jwk> {
        match kid {
            Some(kid) => self.jwks.find(kid),
            None if self.jwks.keys.len() == 1 => self.jwks.keys.first(),
            None => None,
        }
    }

    /// Check signature, issuer, audience, and expiry, returning the raw claims.
    pub(crate) fn verify_id_token(&self, id_token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(id_token)
            .map_err(|e| AuthError::unknown(format!("malformed id_token: {e}"), e))?;

        if !ALLOWED_ALGORITHMS.contains(&header.alg) {
            warn!(alg = ?header.alg, "id_token signed with disallowed algorithm");
            return Err(AuthError::unknown_msg(format!(
                "id_token algorithm {:?} is not allowed",
                header.alg
            )));
        }

        let jwk = self.signing_key(header.kid.as_deref()).ok_or_else(|| {
            warn!(kid = ?header.kid, "no matching oidc signing key");
            AuthError::unknown_msg("id_token is signed with an unknown key")
        })?;
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| AuthError::unknown(format!("unusable oidc signing key: {e}"), e))?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        decode::<Claims>(id_token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!(error = %e, "id_token verification failed");
                AuthError::unknown(format!("id_token verification failed: {e}"), e)
            })
    }
}

#[async_trait]
impl Driver for OidcDriver {
    async fn user_info_from_driver(&self, req: &SigninRequest) -> Result<UserInfo, AuthError> {
        let code = req.string("code")?;
        let state = req.string_or_default("state");

        debug!(issuer = %self.issuer, "exchanging oidc authorization code");
        let token = self
            .oauth
            .exchange_code(AuthorizationCode::new(code))
            .add_extra_param("state", state)
            .request_async(&self.http)
            .await
            .map_err(|e| AuthError::unknown(format!("oidc token exchange failed: {e}"), e))?;

        let id_token = token
            .extra_fields()
            .id_token
            .as_deref()
            .ok_or_else(|| AuthError::unknown_msg("oidc token response has no id_token"))?;

        let claims = self.verify_id_token(id_token)?;
        user_info_from_claims(&claims)
    }

    fn check_signin_request(&self, req: &SigninRequest) -> Result<(), AuthError> {
        req.string("code").map(|_| ())
    }

    fn as_redirectable(&self) -> Option<&dyn Redirectable> {
        Some(self)
    }

    fn as_state_verifiable(&self) -> Option<&dyn StateVerifiable> {
        Some(self)
    }
}

impl Redirectable for OidcDriver {
    fn signin_uri(&self, token: &SigninConsumerToken) -> Result<SigninRedirect, AuthError> {
        let state = self.codec.issue(token)?;
        let (url, _) = self
            .oauth
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(SCOPES.iter().map(|s| Scope::new((*s).to_string())))
            .url();
        Ok(SigninRedirect::get(url.to_string()))
    }
}

impl StateVerifiable for OidcDriver {
    fn check_signin_state_token(
        &self,
        req: &SigninRequest,
    ) -> Result<SigninConsumerToken, AuthError> {
        self.codec.check_request(req)
    }
}
