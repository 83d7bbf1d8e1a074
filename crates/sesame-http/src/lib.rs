// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP plumbing shared by the drivers that talk to an external provider.
//!
//! Every driver uses the same client shape (JSON accept header, a Sesame
//! user agent, a request timeout, redirects never followed) and the same
//! rule for provider responses: anything other than `200 OK` is an
//! [`AuthError::Unknown`] carrying the status and body.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use sesame_core::AuthError;

/// User agent sent on every provider request.
pub const USER_AGENT_VALUE: &str = concat!("sesame/", env!("CARGO_PKG_VERSION"));

/// Build the client a driver uses for its provider calls.
pub fn json_client(timeout: Duration) -> Result<reqwest::Client, AuthError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| AuthError::unknown(format!("failed to build HTTP client: {e}"), e))
}

/// Decode a provider response body, rejecting any non-200 status.
///
/// `what` names the call in error messages, e.g. `"github token exchange"`.
pub async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, AuthError> {
    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        debug!(%status, what, "provider call failed");
        return Err(AuthError::unknown_msg(format!(
            "{what} returned {status}: {body}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| AuthError::unknown(format!("failed to decode {what} response: {e}"), e))
}
