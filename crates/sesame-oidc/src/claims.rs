// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping verified id_token claims onto a [`UserInfo`].

use serde_json::{Map, Value};

use sesame_core::{AuthError, UserInfo};

/// Untyped claim set decoded from a verified id_token.
pub type Claims = Map<String, Value>;

/// Build the identity from verified claims.
///
/// `email_verified` must be the boolean `true`. `sub`, `preferred_username`,
/// and `email` are required; `name` is optional.
pub fn user_info_from_claims(claims: &Claims) -> Result<UserInfo, AuthError> {
    if claims.get("email_verified") != Some(&Value::Bool(true)) {
        return Err(AuthError::InvalidUser(
            "email address is not verified by the identity provider".to_string(),
        ));
    }

    Ok(UserInfo {
        external_id: required(claims, "sub")?,
        username: required(claims, "preferred_username")?,
        email: required(claims, "email")?,
        fullname: claims
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        organization: String::new(),
    })
}

fn required(claims: &Claims, name: &str) -> Result<String, AuthError> {
    match claims.get(name).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(AuthError::InvalidUser(format!(
            "id_token is missing the `{name}` claim"
        ))),
    }
}
