// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request, identity, and manifest types shared by all drivers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::AuthError;

/// Identifies which identity provider a driver speaks to.
///
/// The lowercase form is used in callback URLs (`/auth/callback/<type>`) and in
/// manifest JSON.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Local,
    Github,
    Gitlab,
    Oidc,
}

impl ProviderType {
    /// Callback URL registered with the provider for this driver type.
    pub fn callback_url(&self, base_url: &str) -> String {
        format!("{}/auth/callback/{self}", base_url.trim_end_matches('/'))
    }
}

/// Generic bag of named fields from a signin, signup, or callback request.
///
/// Drivers must read values through [`string`](Self::string) (or
/// [`string_or_default`](Self::string_or_default)) and never pass the raw map
/// further into business logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SigninRequest(HashMap<String, Value>);

impl SigninRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string field, returning the request for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), Value::String(value.into()));
        self
    }

    /// Set a raw JSON field.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// Read a required, non-empty string field.
    ///
    /// Fails with [`AuthError::WrongRequest`] when the field is absent, empty, or
    /// not a JSON string.
    pub fn string(&self, name: &str) -> Result<String, AuthError> {
        match self.0.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            _ => Err(AuthError::missing_field(name)),
        }
    }

    /// Read a string field, returning an empty string when absent or not a string.
    pub fn string_or_default(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

impl<K, V> FromIterator<(K, V)> for SigninRequest
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// Normalized identity produced by a successful authentication.
///
/// `organization` is only ever set by the [`AuthDriver`](crate::AuthDriver)
/// wrapper, never by a concrete driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub external_id: String,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub organization: String,
}

/// Static metadata describing a configured driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDriverManifest {
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    pub signup_disabled: bool,
}

/// A list of manifests, as exposed to clients choosing a signin method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthDriverManifests(pub Vec<AuthDriverManifest>);

impl AuthDriverManifests {
    pub fn find_by_type(&self, provider_type: ProviderType) -> Option<&AuthDriverManifest> {
        self.0.iter().find(|m| m.provider_type == provider_type)
    }

    pub fn exists_type(&self, provider_type: ProviderType) -> bool {
        self.find_by_type(provider_type).is_some()
    }
}

/// The signin intent captured before redirecting to a provider.
///
/// Embedded in the signed state token and handed back unchanged once the
/// callback's state has been verified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigninConsumerToken {
    /// Unix timestamp stamped by the state codec at issuance.
    #[serde(default)]
    pub issued_at: i64,
    /// Client that initiated the flow (`ui`, `cli`, ...).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub origin: String,
    /// Where the caller wants the browser sent after signin.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub require_mfa: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_first_connection: bool,
    /// Attach the provider identity to the currently signed-in user.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub link_user: bool,
}

/// Redirect instruction handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigninRedirect {
    pub method: String,
    pub url: String,
}

impl SigninRedirect {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn string_accessor_rejects_missing_empty_and_non_string() {
        let mut req = SigninRequest::new().with("code", "abc").with("state", "");
        req.insert("count", serde_json::json!(3));

        assert_eq!(req.string("code").unwrap(), "abc");
        for name in ["state", "count", "absent"] {
            let err = req.string(name).unwrap_err();
            assert!(matches!(err, AuthError::WrongRequest(ref m) if m.contains(name)));
        }
    }

    #[test]
    fn string_or_default_never_fails() {
        let req: SigninRequest = [("username", "bob")].into_iter().collect();
        assert_eq!(req.string_or_default("username"), "bob");
        assert_eq!(req.string_or_default("password"), "");
    }

    #[test]
    fn request_deserializes_from_json_object() {
        let req: SigninRequest =
            serde_json::from_str(r#"{"code":"c0de","state":"s","extra":true}"#).unwrap();
        assert_eq!(req.string("code").unwrap(), "c0de");
        assert!(req.contains("extra"));
        assert!(req.string("extra").is_err());
    }

    #[test]
    fn provider_type_lowercase_forms() {
        assert_eq!(ProviderType::Github.to_string(), "github");
        assert_eq!(ProviderType::from_str("oidc").unwrap(), ProviderType::Oidc);
        assert_eq!(
            serde_json::to_string(&ProviderType::Gitlab).unwrap(),
            "\"gitlab\""
        );
        assert!(ProviderType::from_str("ldap").is_err());
    }

    #[test]
    fn callback_url_follows_convention() {
        assert_eq!(
            ProviderType::Gitlab.callback_url("https://auth.example.com/"),
            "https://auth.example.com/auth/callback/gitlab"
        );
    }

    #[test]
    fn manifest_json_shape() {
        let m = AuthDriverManifest {
            provider_type: ProviderType::Local,
            signup_disabled: true,
        };
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json, serde_json::json!({"type": "local", "signup_disabled": true}));
    }

    #[test]
    fn manifests_lookup() {
        let manifests = AuthDriverManifests(vec![AuthDriverManifest {
            provider_type: ProviderType::Github,
            signup_disabled: false,
        }]);
        assert!(manifests.exists_type(ProviderType::Github));
        assert!(!manifests.exists_type(ProviderType::Oidc));
    }

    #[test]
    fn consumer_token_omits_defaults() {
        let token = SigninConsumerToken {
            origin: "ui".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json, serde_json::json!({"issued_at": 0, "origin": "ui"}));
        let back: SigninConsumerToken = serde_json::from_value(json).unwrap();
        assert_eq!(back, token);
    }
}
