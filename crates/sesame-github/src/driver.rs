// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitHub authorization-code flow.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use sesame_core::{
    AuthError, Driver, ProviderType, Redirectable, SigninConsumerToken, SigninRedirect,
    SigninRequest, StateVerifiable, UserInfo,
};
use sesame_http::read_json;
use sesame_state::SigninStateCodec;

use crate::types::{AccessTokenResponse, GithubEmail, GithubUser};

/// Public GitHub web URL (authorize and token endpoints).
pub const DEFAULT_URL: &str = "https://github.com";

/// Public GitHub REST API URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const SCOPE: &str = "user";

/// Settings for a GitHub (or GitHub Enterprise) OAuth application.
#[derive(Debug)]
pub struct GithubConfig {
    /// Web root hosting `/login/oauth/*`.
    pub url: String,
    /// REST API root hosting `/user`.
    pub api_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Public base URL of this service, used to build the callback URL.
    pub base_url: String,
    /// Per-request timeout for calls to GitHub.
    pub timeout: Duration,
}

impl GithubConfig {
    /// Config pointing at github.com with a 30 second request timeout.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            client_id: client_id.into(),
            client_secret,
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Driver authenticating users against GitHub.
#[derive(Debug)]
pub struct GithubDriver {
    config: GithubConfig,
    codec: SigninStateCodec,
    client: reqwest::Client,
    callback_url: String,
}

impl GithubDriver {
    pub fn new(config: GithubConfig, codec: SigninStateCodec) -> Result<Self, AuthError> {
        if config.client_id.is_empty() {
            return Err(AuthError::Config("github client_id must be set".to_string()));
        }
        for (name, value) in [("url", &config.url), ("api_url", &config.api_url)] {
            Url::parse(value)
                .map_err(|e| AuthError::Config(format!("github {name} `{value}` is invalid: {e}")))?;
        }

        let client = sesame_http::json_client(config.timeout)?;

        let callback_url = ProviderType::Github.callback_url(&config.base_url);
        info!(url = %config.url, "github driver configured");

        Ok(Self {
            config,
            codec,
            client,
            callback_url,
        })
    }

    fn web_endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.url.trim_end_matches('/'))
    }

    fn api_endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    async fn exchange_code(&self, code: &str, state: &str) -> Result<String, AuthError> {
        let endpoint = self.web_endpoint("/login/oauth/access_token");
        debug!(endpoint = %endpoint, "exchanging github authorization code");

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("code", code),
            ("state", state),
            ("redirect_uri", self.callback_url.as_str()),
        ];
        let response = self
            .client
            .post(&endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::unknown(format!("github token request failed: {e}"), e))?;

        let body: AccessTokenResponse = read_json(response, "github token exchange").await?;
        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AuthError::unknown_msg(format!(
                "github token exchange rejected: {} {}",
                body.error.unwrap_or_else(|| "no access token".to_string()),
                body.error_description.unwrap_or_default()
            ))),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, AuthError> {
        let endpoint = self.api_endpoint(path);
        debug!(endpoint = %endpoint, "calling github api");
        let response = self
            .client
            .get(&endpoint)
            .header(AUTHORIZATION, format!("token {token}"))
            .send()
            .await
            .map_err(|e| AuthError::unknown(format!("github {path} request failed: {e}"), e))?;
        read_json(response, &format!("github {path}")).await
    }

    /// Primary verified address from `/user/emails`, for profiles hiding their email.
    async fn primary_email(&self, token: &str) -> Result<String, AuthError> {
        let emails: Vec<GithubEmail> = self.get_json("/user/emails", token).await?;
        Ok(emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Driver for GithubDriver {
    async fn user_info_from_driver(&self, req: &SigninRequest) -> Result<UserInfo, AuthError> {
        let code = req.string("code")?;
        let state = req.string_or_default("state");

        let token = self.exchange_code(&code, &state).await?;
        let user: GithubUser = self.get_json("/user", &token).await?;

        let email = match user.email.filter(|e| !e.is_empty()) {
            Some(email) => email,
            None => self.primary_email(&token).await?,
        };

        Ok(UserInfo {
            external_id: user.id.to_string(),
            username: user.login,
            fullname: user.name.unwrap_or_default(),
            email,
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

impl Redirectable for GithubDriver {
    fn signin_uri(&self, token: &SigninConsumerToken) -> Result<SigninRedirect, AuthError> {
        let state = self.codec.issue(token)?;
        let url = Url::parse_with_params(
            &self.web_endpoint("/login/oauth/authorize"),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("scope", SCOPE),
                ("state", state.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
            ],
        )
        .map_err(|e| AuthError::unknown(format!("failed to build github authorize url: {e}"), e))?;
        Ok(SigninRedirect::get(url.to_string()))
    }
}

impl StateVerifiable for GithubDriver {
    fn check_signin_state_token(
        &self,
        req: &SigninRequest,
    ) -> Result<SigninConsumerToken, AuthError> {
        self.codec.check_request(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sesame_state::DEFAULT_STATE_VALIDITY;
    use wiremock::matchers::{any, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn codec() -> SigninStateCodec {
        SigninStateCodec::from_bytes(b"github-test-signing-key-0123456789", DEFAULT_STATE_VALIDITY)
            .unwrap()
    }

    fn driver(server_uri: &str) -> GithubDriver {
        let mut config = GithubConfig::new(
            "gh-client",
            SecretString::from("gh-secret".to_string()),
            "https://auth.example.com",
        );
        config.url = server_uri.to_string();
        config.api_url = server_uri.to_string();
        GithubDriver::new(config, codec()).unwrap()
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .and(header("accept", "application/json"))
            .and(body_string_contains("client_id=gh-client"))
            .and(body_string_contains("client_secret=gh-secret"))
            .and(body_string_contains("code=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "gho_123",
                "token_type": "bearer",
                "scope": "user"
            })))
            .mount(server)
            .await;
    }

    fn callback() -> SigninRequest {
        SigninRequest::new().with("code", "abc").with("state", "s")
    }

    #[tokio::test]
    async fn user_info_maps_profile() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "token gho_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42, "login": "bob", "email": "b@x.com"
            })))
            .mount(&server)
            .await;

        let info = driver(&server.uri())
            .user_info_from_driver(&callback())
            .await
            .unwrap();
        assert_eq!(
            info,
            UserInfo {
                external_id: "42".into(),
                username: "bob".into(),
                email: "b@x.com".into(),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn hidden_email_falls_back_to_primary_verified() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7, "login": "alice", "name": "Alice Liddell", "email": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"email": "old@x.com", "primary": false, "verified": true},
                {"email": "alice@x.com", "primary": true, "verified": true}
            ])))
            .mount(&server)
            .await;

        let info = driver(&server.uri())
            .user_info_from_driver(&callback())
            .await
            .unwrap();
        assert_eq!(info.email, "alice@x.com");
        assert_eq!(info.fullname, "Alice Liddell");
    }

    #[tokio::test]
    async fn missing_code_fails_before_network() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let d = driver(&server.uri());
        let req = SigninRequest::new().with("state", "s");
        assert!(matches!(
            d.check_signin_request(&req),
            Err(AuthError::WrongRequest(_))
        ));
        let err = d.user_info_from_driver(&req).await.unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m.contains("code")));
    }

    #[tokio::test]
    async fn token_endpoint_failure_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .expect(1)
            .mount(&server)
            .await;

        let err = driver(&server.uri())
            .user_info_from_driver(&callback())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unknown { ref message, .. } if message.contains("502")));
    }

    #[tokio::test]
    async fn rejected_code_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            })))
            .mount(&server)
            .await;

        let err = driver(&server.uri())
            .user_info_from_driver(&callback())
            .await
            .unwrap_err();
        assert!(
            matches!(err, AuthError::Unknown { ref message, .. } if message.contains("bad_verification_code"))
        );
    }

    #[tokio::test]
    async fn user_endpoint_failure_is_unknown() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = driver(&server.uri())
            .user_info_from_driver(&callback())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unknown { .. }));
    }

    #[test]
    fn signin_uri_carries_oauth_params() {
        let d = driver("https://github.example.com");
        let redirect = d
            .signin_uri(&SigninConsumerToken {
                origin: "ui".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(redirect.method, "GET");

        let url = Url::parse(&redirect.url).unwrap();
        assert_eq!(url.path(), "/login/oauth/authorize");
        let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query["client_id"], "gh-client");
        assert_eq!(query["scope"], "user");
        assert_eq!(
            query["redirect_uri"],
            "https://auth.example.com/auth/callback/github"
        );

        let back = d
            .check_signin_state_token(&SigninRequest::new().with("state", query["state"].clone()))
            .unwrap();
        assert_eq!(back.origin, "ui");
    }

    #[test]
    fn missing_state_is_wrong_request() {
        let d = driver("https://github.example.com");
        let err = d
            .check_signin_state_token(&SigninRequest::new().with("code", "abc"))
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongRequest(ref m) if m.contains("state")));
    }

    #[test]
    fn capabilities_are_advertised() {
        let d = driver("https://github.example.com");
        assert!(d.as_redirectable().is_some());
        assert!(d.as_state_verifiable().is_some());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = |client_id: &str, api_url: &str| {
            let mut config = GithubConfig::new(
                client_id,
                SecretString::from("s".to_string()),
                "https://auth.example.com",
            );
            config.api_url = api_url.to_string();
            config
        };
        assert!(matches!(
            GithubDriver::new(config("", DEFAULT_API_URL), codec()),
            Err(AuthError::Config(_))
        ));
        assert!(matches!(
            GithubDriver::new(config("id", "not a url"), codec()),
            Err(AuthError::Config(ref m)) if m.contains("api_url")
        ));
    }
}
