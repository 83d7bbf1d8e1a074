// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitHub API response types.

use serde::Deserialize;

/// Body of `POST /login/oauth/access_token` with `Accept: application/json`.
///
/// GitHub answers 200 even for rejected codes, carrying `error` instead of a
/// token.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Subset of `GET /user`.
#[derive(Debug, Deserialize)]
pub(crate) struct GithubUser {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Entry of `GET /user/emails`.
#[derive(Debug, Deserialize)]
pub(crate) struct GithubEmail {
    pub email: String,
    pub primary: bool,
    pub verified: bool,
}
