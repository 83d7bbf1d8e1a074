// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use sesame_core::{
    AuthError, Driver, ProviderType, Redirectable, SigninConsumerToken, SigninRedirect,
    SigninRequest, StateVerifiable, UserInfo,
};
use sesame_http::read_json;
use sesame_state::SigninStateCodec;

/// gitlab.com.
pub const DEFAULT_URL: &str = "https://gitlab.com";

const SCOPE: &str = "read_user";

/// Settings for a GitLab OAuth application.
#[derive(Debug)]
pub struct GitlabConfig {
    /// Instance root, e.g. `https://gitlab.example.com`.
    pub url: String,
    pub application_id: String,
    pub secret: SecretString,
    /// Public base URL of this service, used to build the callback URL.
    pub base_url: String,
    pub timeout: Duration,
}

impl GitlabConfig {
    pub fn new(
        application_id: impl Into<String>,
        secret: SecretString,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            application_id: application_id.into(),
            secret,
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GitlabUser {
    id: u64,
    username: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Driver authenticating users against a GitLab instance.
#[derive(Debug)]
pub struct GitlabDriver {
    config: GitlabConfig,
    codec: SigninStateCodec,
    client: reqwest::Client,
    callback_url: String,
}

impl GitlabDriver {
    pub fn new(config: GitlabConfig, codec: SigninStateCodec) -> Result<Self, AuthError> {
        if config.application_id.is_empty() {
            return Err(AuthError::Config(
                "gitlab application_id must be set".to_string(),
            ));
        }
        Url::parse(&config.url)
            .map_err(|e| AuthError::Config(format!("gitlab url `{}` is invalid: {e}", config.url)))?;

        let client = sesame_http::json_client(config.timeout)?;

        let callback_url = ProviderType::Gitlab.callback_url(&config.base_url);
        info!(url = %config.url, "gitlab driver configured");

        Ok(Self {
            config,
            codec,
            client,
            callback_url,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.url.trim_end_matches('/'))
    }

    async fn exchange_code(&self, code: &str, state: &str) -> Result<String, AuthError> {
        let endpoint = self.endpoint("/oauth/token");
        debug!(endpoint = %endpoint, "exchanging gitlab authorization code");

        let params = [
            ("client_id", self.config.application_id.as_str()),
            ("client_secret", self.config.secret.expose_secret()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.callback_url.as_str()),
            ("state", state),
        ];
        let response = self
            .client
            .post(&endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::unknown(format!("gitlab token request failed: {e}"), e))?;

        let token: TokenResponse = read_json(response, "gitlab token exchange").await?;
        Ok(token.access_token)
    }

    async fn current_user(&self, token: &str) -> Result<GitlabUser, AuthError> {
        let endpoint = self.endpoint("/api/v4/user");
        debug!(endpoint = %endpoint, "fetching gitlab user");
        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::unknown(format!("gitlab user request failed: {e}"), e))?;
        read_json(response, "gitlab user").await
    }
}

#[async_trait]
impl Driver for GitlabDriver {
    async fn user_info_from_driver(&self, req: &SigninRequest) -> Result<UserInfo, AuthError> {
        let code = req.string("code")?;
        let state = req.string_or_default("state");

        let token = self.exchange_code(&code, &state).await?;
        let user = self.current_user(&token).await?;

        Ok(UserInfo {
            external_id: user.id.to_string(),
            username: user.username,
            fullname: user.name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
            organization: String::new(),
        })
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

impl Redirectable for GitlabDriver {
    fn signin_uri(&self, token: &SigninConsumerToken) -> Result<SigninRedirect, AuthError> {
        let state = self.codec.issue(token)?;
        let url = Url::parse_with_params(
            &self.endpoint("/oauth/authorize"),
            &[
                ("client_id", self.config.application_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPE),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| AuthError::unknown(format!("failed to build gitlab authorize url: {e}"), e))?;
        Ok(SigninRedirect::get(url.to_string()))
    }
}

impl StateVerifiable for GitlabDriver {
    fn check_signin_state_token(
        &self,
        req: &SigninRequest,
    ) -> Result<SigninConsumerToken, AuthError> {
        self.codec.check_request(req)
    }
}
